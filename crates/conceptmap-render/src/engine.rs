use crate::Result;
use crate::tree::VisualTree;
use futures::future::LocalBoxFuture;

/// A diagram renderer that turns mindmap text into a [`VisualTree`].
///
/// Submission is asynchronous and may take arbitrarily long; the coordinator never assumes an
/// upper bound. Implementations must not retain the returned tree.
pub trait DiagramRenderer {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "renderer"
    }

    fn submit<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, Result<VisualTree>>;
}

impl<R: DiagramRenderer + ?Sized> DiagramRenderer for std::rc::Rc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn submit<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, Result<VisualTree>> {
        (**self).submit(text)
    }
}
