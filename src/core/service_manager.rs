use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::error;

const RESTART_DELAY: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
#[error("{0}")]
pub struct Error(String);

impl Error {
    pub fn new(s: &str) -> Error {
        Error(s.to_string())
    }

    pub fn from<E: std::error::Error>(e: E) -> Self {
        Self(e.to_string())
    }
}

#[async_trait]
pub trait Service: Sized + Send {
    type Context: Clone + Send;
    async fn new(context: Self::Context) -> Result<Self, Error>;
    async fn run(self) -> Result<(), Error>;
}

pub struct ServiceManager<C> {
    context: C,
    services: JoinSet<()>,
}

impl<C> ServiceManager<C>
where
    C: 'static + Clone + Send,
{
    pub fn new(context: C) -> Self {
        Self {
            context,
            services: JoinSet::new(),
        }
    }

    /// Runs the service until it fails to start; a failed run is restarted.
    pub fn spawn<T: Service<Context = C> + 'static>(&mut self) {
        let context = self.context.clone();
        self.services.spawn(async move {
            loop {
                let service = match T::new(context.clone()).await {
                    Ok(service) => service,
                    Err(e) => {
                        error!(error = %e, "Service failed to start");
                        break;
                    }
                };
                if let Err(e) = service.run().await {
                    error!(error = %e, "Service stopped, restarting");
                    tokio::time::sleep(RESTART_DELAY).await;
                    continue;
                }
                break;
            }
        });
    }

    pub async fn wait(&mut self) -> Result<(), Error> {
        if self.services.join_next().await.is_some() {
            return Err(Error::new("Internal Service Error"));
        }
        Ok(())
    }
}
