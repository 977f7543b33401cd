use crate::{lyrics, tg};
use serde::de::DeserializeOwned;

pub struct Config {
    pub(crate) tg: tg::Config,
    pub(crate) lyrics: lyrics::Config,
}

impl Config {
    /// Reads the whole config from the environment. Missing required
    /// variables (e.g. `TG_BOT_TOKEN`) abort the process before the bot
    /// starts serving any updates.
    pub fn load_or_panic() -> Config {
        Self {
            tg: from_env_or_panic("TG_"),
            lyrics: from_env_or_panic("LYRICS_"),
        }
    }
}

pub(crate) fn from_env_or_panic<T: DeserializeOwned>(prefix: &str) -> T {
    envy::prefixed(prefix).from_env().unwrap_or_else(|err| {
        panic!(
            "BUG: Couldn't load config from environment for {}: {:#?}",
            std::any::type_name::<T>(),
            err
        );
    })
}
