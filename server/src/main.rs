use todo_order_lib::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    rolling_logger::init_logger(&config.log_dir, "todo-order")?;

    todo_order_lib::run(config).await
}
