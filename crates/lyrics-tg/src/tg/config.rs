use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone)]
pub(crate) struct Config {
    pub(crate) bot_token: String,

    /// Directory for the transient files with the lyrics that are too long
    /// to be sent as a text message
    #[serde(default = "default_downloads_dir")]
    pub(crate) downloads_dir: PathBuf,
}

fn default_downloads_dir() -> PathBuf {
    "downloads".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_env(vars: &[(&str, &str)]) -> envy::Result<Config> {
        envy::prefixed("TG_").from_iter(
            vars.iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned())),
        )
    }

    #[test]
    fn defaults() {
        let config = from_env(&[("TG_BOT_TOKEN", "123:abc"), ("TG_BOT_LOG", "debug")]).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.downloads_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn token_is_required() {
        assert!(from_env(&[("TG_DOWNLOADS_DIR", "/tmp/lyrics")]).is_err());
    }
}
