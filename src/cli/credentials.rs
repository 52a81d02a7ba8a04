use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::{api::zaptec::Credentials, prelude::*};

#[derive(Parser)]
pub struct CredentialArgs {
    /// Zaptec API username. Overrides the secrets file and the environment.
    #[clap(long)]
    pub username: Option<String>,

    /// Zaptec API password. Overrides the secrets file and the environment.
    #[clap(long)]
    pub password: Option<String>,

    /// Path to the TOML secrets file with a `[zaptec]` table. Default is `secrets.toml`.
    #[clap(long = "secrets_file", alias = "secrets-file")]
    pub secrets_file: Option<PathBuf>,
}

impl CredentialArgs {
    const DEFAULT_SECRETS_FILE: &'static str = "secrets.toml";

    const USERNAME_VARIABLES: [&'static str; 2] = ["ZAPTEC_USERNAME", "ZAPTECH_USERNAME"];
    const PASSWORD_VARIABLES: [&'static str; 2] = ["ZAPTEC_PASSWORD", "ZAPTECH_PASSWORD"];

    /// Resolve the credentials: command line, then secrets file, then environment.
    #[instrument(skip_all)]
    pub fn resolve(&self) -> Result<Credentials> {
        self.resolve_with(Path::new(Self::DEFAULT_SECRETS_FILE), |name| std::env::var(name).ok())
    }

    fn resolve_with(
        &self,
        default_secrets_file: &Path,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials> {
        if let Some(credentials) = self.from_args() {
            info!(source = "command line", "using credentials");
            return Ok(credentials);
        }
        if let Some(credentials) = self.from_secrets_file(default_secrets_file)? {
            info!(source = "secrets file", "using credentials");
            return Ok(credentials);
        }
        if let Some(credentials) = Self::from_environment(var) {
            info!(source = "environment", "using credentials");
            return Ok(credentials);
        }
        bail!(
            "credentials are missing: provide `--username` and `--password`, a secrets file, or `ZAPTEC_USERNAME` and `ZAPTEC_PASSWORD`"
        )
    }

    fn from_args(&self) -> Option<Credentials> {
        Credentials::non_empty(self.username.clone()?, self.password.clone()?)
    }

    fn from_secrets_file(&self, default_path: &Path) -> Result<Option<Credentials>> {
        let (path, is_explicit) = match &self.secrets_file {
            Some(path) => (path.as_path(), true),
            None => (default_path, false),
        };
        if !path.is_file() {
            ensure!(!is_explicit, "secrets file `{}` does not exist", path.display());
            debug!(path = %path.display(), "no secrets file");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let secrets: SecretsFile = toml::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        Ok(secrets.into_credentials())
    }

    fn from_environment(var: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
        let lookup = |names: [&str; 2]| names.into_iter().find_map(&var);
        Credentials::non_empty(
            lookup(Self::USERNAME_VARIABLES)?,
            lookup(Self::PASSWORD_VARIABLES)?,
        )
    }
}

#[derive(Deserialize)]
struct SecretsFile {
    zaptec: Option<ZaptecSecrets>,
}

#[derive(Deserialize)]
struct ZaptecSecrets {
    username: Option<String>,
    password: Option<String>,
}

impl SecretsFile {
    fn into_credentials(self) -> Option<Credentials> {
        let zaptec = self.zaptec?;
        Credentials::non_empty(zaptec.username?, zaptec.password?)
    }
}
