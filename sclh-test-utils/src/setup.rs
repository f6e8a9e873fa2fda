use mockito::{Mock, Server, ServerGuard};

/// Mock upstream server for one test.
pub struct TestSetup {
    pub server: ServerGuard,
    pub mocks: Vec<Mock>,
}

impl TestSetup {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    /// Base URL to configure as `ESI_URL`.
    pub fn esi_url(&self) -> String {
        format!("{}/esi/", self.server.url())
    }

    /// Base URL to configure as `ZKILL_URL`.
    pub fn zkill_url(&self) -> String {
        format!("{}/zkill/", self.server.url())
    }

    /// Keep a mock around so [`assert_mocks`](Self::assert_mocks) verifies it.
    pub fn track(&mut self, mock: Mock) {
        self.mocks.push(mock);
    }

    /// Assert all tracked mock endpoints were called as expected.
    ///
    /// # Panics
    /// Panics if any mock endpoint was not called the expected number of times
    pub fn assert_mocks(&self) {
        for mock in &self.mocks {
            mock.assert();
        }
    }
}
