use autodev_core::config::Config;

pub fn run(host: &str, port: u16) -> anyhow::Result<()> {
    let workspace = Config::from_env().workspace;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(autodev_server::serve(host, port, workspace))
}
