/// Which of the two resource services this process mounts.
///
/// The tweet and user services were historically deployed separately, each with its own
/// database. `All` is convenient for local development.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Service {
    #[default]
    All,
    Tweet,
    User,
}

/// The configuration parameters for the application.
///
/// These can either be passed on the command line, or pulled from environment variables.
/// The latter is preferred as environment variables are one of the recommended ways to
/// get configuration from Kubernetes Secrets in deployment.
///
/// For development convenience, these can also be read from a `.env` file in the working
/// directory where the application is started.
///
/// See `.env.sample` in the repository root for details.
#[derive(clap::Parser, Debug, Default)]
pub struct Config {
    /// The connection URL for the Postgres database this application should use.
    #[clap(long, env)]
    pub database_url: String,

    /// Port the HTTP server listens on.
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    /// Resource service(s) to mount.
    #[clap(long, env, value_enum, default_value_t = Service::All)]
    pub service: Service,

    /// Upper bound on pooled database connections.
    #[clap(long, env, default_value_t = 50)]
    pub max_connections: u32,
}
