use crate::domain::broker::ResourceBroker;

use actix::prelude::{Actor, Context};

impl Actor for ResourceBroker {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        log::info!("Resource broker started: {}", self.manager.summary());
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        log::info!("Resource broker stopped");
    }
}
