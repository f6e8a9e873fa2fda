use crate::TestSetup;

pub mod factory;
pub mod mockito;

impl TestSetup {
    pub fn zkill<'a>(&'a mut self) -> ZkillFixtures<'a> {
        ZkillFixtures { setup: self }
    }
}

pub struct ZkillFixtures<'a> {
    pub setup: &'a mut TestSetup,
}
