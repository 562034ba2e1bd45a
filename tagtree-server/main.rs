use actix_web::{
  App,
  HttpServer,
  middleware::Logger,
  web,
};
use anyhow::Context;
use clap::Parser;

mod proxy;

use proxy::ProxyState;

#[derive(Parser, Debug)]
#[command(name = "tagtree-server", about = "Translation proxy for the tagtree editor")]
struct Cli {
  /// Port to listen on
  #[arg(short = 'p', long = "port", default_value_t = 3002)]
  port: u16,

  /// Upstream translation endpoint
  #[arg(
    long = "upstream",
    default_value = "https://api-free.deepl.com/v2/translate"
  )]
  upstream: String,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = clap::ArgAction::Count)]
  verbosity: u8,
}

fn setup_logging(verbosity: u8) -> Result<(), fern::InitError> {
  let level = match verbosity {
    0 => log::LevelFilter::Info,
    1 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };
  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "[{}] {}: {}",
        record.level(),
        record.target(),
        message
      ))
    })
    .level(level)
    .chain(std::io::stderr())
    .apply()?;
  Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbosity).context("failed to initialize logging")?;

  let api_key = std::env::var("DEEPL_API_KEY")
    .context("DEEPL_API_KEY is not set; the proxy cannot start without it")?;

  let state = web::Data::new(ProxyState::new(cli.upstream, api_key)?);
  let port = cli.port;
  log::info!("listening on http://localhost:{port}");

  HttpServer::new(move || {
    App::new()
      .app_data(state.clone())
      .wrap(Logger::default())
      .service(proxy::health)
      .service(proxy::translate)
  })
  .bind(("127.0.0.1", port))
  .with_context(|| format!("failed to bind port {port}"))?
  .run()
  .await?;
  Ok(())
}
