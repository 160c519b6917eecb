use crate::commands::CommandError;
use crate::frame::Frame;
use crate::store::Storage;

pub trait Executable {
    fn exec(self, store: &dyn Storage) -> Result<Frame, CommandError>;
}
