use anyhow::Result;

pub mod lookup;
pub mod publish;
pub mod serve;
pub mod settings;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}
