mod config;
mod error;
mod http;
mod lyrics;
mod observability;
mod tg;
mod util;

pub use crate::error::*;
pub use config::*;
pub use observability::*;

#[allow(unused_imports)]
mod prelude {
    pub(crate) use crate::error::prelude::*;
    pub(crate) use crate::http::prelude::*;
    pub(crate) use crate::observability::logging::prelude::*;
    pub(crate) use crate::util::prelude::*;
}

/// Run the telegram bot processing loop
pub async fn run(config: Config) -> Result<()> {
    let http = http::create_client(config.lyrics.http_timeout())?;

    let lyrics = lyrics::LyricsPipeline::from_config(&config.lyrics, http);

    let opts = tg::RunBotOptions {
        tg_cfg: config.tg,
        lyrics,
    };

    tg::run_bot(opts).await
}
