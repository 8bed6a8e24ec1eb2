use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::backend::Backend;
use crate::builder::Query;
use crate::driver::Driver;
use crate::entity::Entity;
use crate::error::QueryError;

/// Entry point for queries. The backend is picked once, from the driver's
/// dialect, and shared by every query the client creates.
#[derive(Clone)]
pub struct Client {
    driver: Arc<dyn Driver>,
    backend: Backend,
}

impl Client {
    pub fn new(driver: Arc<dyn Driver>) -> Result<Self, QueryError> {
        let backend = Backend::for_dialect(driver.dialect())?;
        debug!(dialect = driver.dialect(), ?backend, "query client ready");
        Ok(Self { driver, backend })
    }

    pub fn query<E: Entity>(&self) -> Query<E> {
        Query::new(self.clone())
    }

    pub fn dialect(&self) -> &str {
        self.driver.dialect()
    }

    pub(crate) fn backend(&self) -> &Backend {
        &self.backend
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("dialect", &self.driver.dialect())
            .field("backend", &self.backend)
            .finish()
    }
}
