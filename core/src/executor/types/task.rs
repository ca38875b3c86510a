use crate::plan::Task;

/// Common task interface for executor graph handling.
pub trait TaskLike {
    fn id(&self) -> &str;
    fn dependencies(&self) -> &[String];
}

impl TaskLike for Task {
    fn id(&self) -> &str {
        &self.number
    }

    fn dependencies(&self) -> &[String] {
        &self.depends_on
    }
}

impl<T: TaskLike> TaskLike for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn dependencies(&self) -> &[String] {
        (**self).dependencies()
    }
}
