use crate::{error::Result, event::Event};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Observer
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event) -> Result<()>;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct NotifyFnObserver<F>
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    f: F,
}

impl<F> NotifyFnObserver<F>
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        NotifyFnObserver { f }
    }
}

impl<F> Observer for NotifyFnObserver<F>
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    fn notify(&self, event: &Event) -> Result<()> {
        (self.f)(event)
    }
}
