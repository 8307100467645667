use crate::api::module_dto::{ModuleDto, ModuleType};
use crate::domain::graph::resource_graph::{GraphSummary, ResourceGraph};
use crate::domain::resource_manager::ResourceManager;
use crate::domain::utils::id::NodeId;
use crate::error::Result;

impl ResourceManager {
    /// Rebuilds the whole graph from the site inventory.
    ///
    /// The new graph is assembled on the side and swapped in at the end, so a
    /// failing inventory read leaves the current topology untouched. Bad
    /// storage -> DTN map entries are logged and skipped.
    ///
    /// Jobs of the old graph are not re-attached; their load stops counting.
    pub fn construct(&mut self) -> Result<GraphSummary> {
        let storages = self.store.list_storages()?;
        let dtns = self.store.list_dtns()?;
        let sd_maps = self.store.list_storage_dtn_map()?;

        let mut graph = ResourceGraph::new();
        graph.add_gateway();

        for storage in &storages {
            let node = graph.add_storage_node(&storage.id, &storage.name, storage.io_capacity);
            node.base.queue = storage.queue_name.clone();
            node.set_root_folder(storage.root_folder.as_str());
            node.base.properties = serde_json::to_value(storage).unwrap_or_default();

            log::info!("storage: {} ({}) added.", storage.id, storage.name);
        }
        log::info!("{} storage nodes created", storages.len());

        for dtn in &dtns {
            let node = graph.add_dtn_node(&dtn.id, &dtn.name, 0.0);
            node.set_ctrl_ip(dtn.ctrl_interface.ip.as_str());
            node.base.queue = dtn.queue_name.clone();
            node.base.properties = serde_json::to_value(dtn).unwrap_or_default();

            match graph.add_edge_to_gateway(&dtn.id, dtn.link_rate()) {
                Ok(_) => log::info!("dtn: {} ({}) added.", dtn.id, dtn.name),
                Err(e) => log::error!("dtn: {} ({}) added without gateway edge: {}", dtn.id, dtn.name, e),
            }
        }
        log::info!("{} dtn nodes created", dtns.len());

        let mut wired = 0;
        for sd_map in &sd_maps {
            match wire_storage_dtn(&mut graph, &sd_map.storage, &sd_map.dtn, self.config.storage_dtn_link_rate) {
                Ok(()) => {
                    wired += 1;
                    log::info!("storage: {} -> DTN: {} map added.", sd_map.storage, sd_map.dtn);
                }
                Err(e) => log::warn!("Fail to add storage to dtn map: {} -> {} ({})", sd_map.storage, sd_map.dtn, e),
            }
        }
        log::info!("{} of {} storage to dtn maps created", wired, sd_maps.len());

        self.graph = graph;

        let summary = self.graph.summary();
        log::info!("[ResourceGraph]: {}", summary);
        Ok(summary)
    }

    /// Adds the modules an agent announced when joining.
    ///
    /// Runs in two passes: all nodes first, then the storage -> DTN edges each DTN
    /// reports. Module lists are not ordered topologically, and an edge needs both
    /// of its endpoints to exist.
    pub fn add_modules(&mut self, queue: &str, modules: &[ModuleDto]) -> GraphSummary {
        for module in modules {
            self.add_module_node(queue, module);
        }

        for module in modules.iter().filter(|m| m.typ == ModuleType::Dtn) {
            for storage in &module.storages {
                match wire_storage_dtn(&mut self.graph, &storage.id, &module.id, self.config.storage_dtn_link_rate) {
                    Ok(()) => log::info!("storage ({}) -> dtn ({}) map added.", storage.name, module.name),
                    Err(e) => log::warn!("Fail to add storage to dtn map: {} -> {} ({})", storage.name, module.name, e),
                }
            }
        }

        let summary = self.graph.summary();
        log::info!("[ResourceGraph]: {}", summary);
        log::debug!("active dtn topology: {:?}", self.active_dtn_topology());
        summary
    }

    fn add_module_node(&mut self, queue: &str, module: &ModuleDto) {
        let properties = serde_json::to_value(module).unwrap_or_default();

        match &module.typ {
            ModuleType::Dtn => {
                let node = self.graph.add_dtn_node(&module.id, &module.name, 0.0);
                node.set_ctrl_ip(module.ctrl_ip());
                node.base.queue = queue.to_string();
                node.base.properties = properties;

                match self.graph.add_edge_to_gateway(&module.id, module.link_rate()) {
                    Ok(_) => log::info!("dtn: {} ({}) added.", module.id, module.name),
                    Err(e) => log::error!("dtn: {} ({}) added without gateway edge: {}", module.id, module.name, e),
                }
            }
            ModuleType::LocalStorage => {
                let node = self.graph.add_storage_node(&module.id, &module.name, self.config.registered_storage_capacity);
                node.base.queue = queue.to_string();
                if let Some(root_folder) = &module.root_folder {
                    node.set_root_folder(root_folder.as_str());
                }
                node.base.properties = properties;

                log::info!("storage: {} ({}) added.", module.id, module.name);
            }
            ModuleType::Launcher => {
                if self.graph.has_launcher() {
                    log::error!("already has a launcher agent registered, will delete the current launcher");
                    self.graph.del_launcher();
                }
                self.graph.add_launcher(&module.id, queue).base.properties = properties;
                log::info!("launcher agent: {} ({}) added.", module.id, module.name);
            }
            ModuleType::Sdn => {
                if self.graph.has_sdn() {
                    log::error!("already has an SDN agent registered, will delete the current SDN agent");
                    self.graph.del_sdn();
                }
                self.graph.add_sdn(&module.id, queue).base.properties = properties;
                log::info!("sdn agent: {} ({}) added.", module.id, module.name);
            }
            ModuleType::Unknown(typ) => {
                log::error!("unknown module type of module {} ({}): {}", module.id, module.name, typ);
            }
        }
    }

    /// Removes the modules of a leaving agent. Modules that are not in the graph are ignored.
    pub fn del_modules(&mut self, modules: &[ModuleDto]) -> GraphSummary {
        for module in modules {
            match self.graph.del_node(&module.id) {
                Ok(()) => log::info!("{:?}: {} ({}) has been deleted", module.typ, module.id, module.name),
                Err(e) => log::error!("{:?}: {} ({}) was not deleted: {}", module.typ, module.id, module.name, e),
            }
        }

        let summary = self.graph.summary();
        log::info!("[ResourceGraph]: {}", summary);
        summary
    }
}

/// Adds the storage -> DTN edge and makes the DTN the storage's primary one.
fn wire_storage_dtn(graph: &mut ResourceGraph, storage_id: &str, dtn_id: &str, rate: f64) -> Result<()> {
    graph.storage_node(storage_id)?;
    graph.dtn_node(dtn_id)?;

    graph.add_edge(storage_id, dtn_id, rate)?;
    graph.storage_node_mut(storage_id)?.set_primary_dtn(NodeId::new(dtn_id));

    Ok(())
}
