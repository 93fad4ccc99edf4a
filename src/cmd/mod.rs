mod bot;
mod convert;
mod publish;

use crate::prelude::*;
use async_trait::async_trait;

pub use bot::*;
pub use convert::*;
pub use publish::*;

#[async_trait]
pub(crate) trait Cmd {
    async fn run(self) -> Result;
}
