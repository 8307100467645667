use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::Arc;
use tracing_test::traced_test;

use crate::api::inventory_dto::{DtnDto, InventoryDto, StorageDtnMapDto, StorageDto};
use crate::api::module_dto::{ModuleDto, ModuleStorageDto, ModuleType};
use crate::api::reservation_dto::ReservationRecord;
use crate::config::BrokerConfig;
use crate::domain::graph::resource_graph::GATEWAY_ID;
use crate::domain::job::job::JobState;
use crate::domain::resource_manager::ResourceManager;
use crate::domain::resource_manager::admission::AdmissionStatus;
use crate::domain::resource_manager::job_materialization::{JobRequest, TransferRequest};
use crate::domain::resource_manager::path_selection::DtnFragment;
use crate::domain::store::json_site_store::JsonSiteStore;
use crate::domain::store::site_store::SiteStore;
use crate::domain::utils::id::{JobId, NodeId};
use crate::error::{Error, Result};

fn manager() -> (ResourceManager, Arc<JsonSiteStore>) {
    let store = Arc::new(JsonSiteStore::new(InventoryDto::default(), 600_000));
    (ResourceManager::new(store.clone(), BrokerConfig::default()), store)
}

fn add_dtn(manager: &mut ResourceManager, id: &str, gateway_rate: f64) {
    manager.graph_mut().add_dtn_node(id, id, 0.0).set_ctrl_ip(format!("10.0.0.{}", id.len()));
    manager.graph_mut().add_edge_to_gateway(id, gateway_rate).unwrap();
}

fn add_storage(manager: &mut ResourceManager, id: &str, capacity: f64) {
    manager.graph_mut().add_storage_node(id, id, capacity);
}

fn wire(manager: &mut ResourceManager, storage: &str, dtn: &str, rate: f64) {
    manager.graph_mut().add_edge(storage, dtn, rate).unwrap();
}

/// s1 (50e9) -> d1 (40e9 to the gateway) over a 40e9 edge.
fn single_path() -> (ResourceManager, Arc<JsonSiteStore>) {
    let (mut manager, store) = manager();
    add_dtn(&mut manager, "d1", 40e9);
    add_storage(&mut manager, "s1", 50e9);
    wire(&mut manager, "s1", "d1", 40e9);
    (manager, store)
}

fn state_of(manager: &ResourceManager, job_id: &JobId) -> JobState {
    manager.ledger().get(job_id).unwrap().state
}

#[derive(Debug)]
struct FailingStore;

impl SiteStore for FailingStore {
    fn list_storages(&self) -> Result<Vec<StorageDto>> {
        Err(Error::PersistenceError("store offline".to_string()))
    }

    fn list_dtns(&self) -> Result<Vec<DtnDto>> {
        Err(Error::PersistenceError("store offline".to_string()))
    }

    fn list_storage_dtn_map(&self) -> Result<Vec<StorageDtnMapDto>> {
        Err(Error::PersistenceError("store offline".to_string()))
    }

    fn persist_job_state(&self, _job_id: &JobId, _state: JobState) -> Result<()> {
        Err(Error::PersistenceError("store offline".to_string()))
    }

    fn persist_reservation(&self, _record: &ReservationRecord) -> Result<()> {
        Err(Error::PersistenceError("store offline".to_string()))
    }
}

fn inventory() -> InventoryDto {
    serde_json::from_value(json!({
        "storages": [
            { "id": "s1", "name": "lustre", "io_capacity": 50e9, "queue_name": "site-a", "root_folder": "/lustre" },
            { "id": "s2", "name": "scratch", "io_capacity": 20e9, "queue_name": "site-a" }
        ],
        "dtns": [
            { "id": "d1", "name": "dtn one", "queue_name": "site-a",
              "ctrl_interface": { "ip": "10.0.0.1" }, "data_interfaces": [ { "rate": 40e9 } ], "expire_at": 1_000_000 },
            { "id": "d2", "name": "dtn two", "queue_name": "site-a",
              "ctrl_interface": { "ip": "10.0.0.2" }, "data_interfaces": [ { "rate": 40e9 } ], "expire_at": 10 }
        ],
        "storage_dtn_map": [
            { "storage": "s1", "dtn": "d1" },
            { "storage": "s1", "dtn": "d2" },
            { "storage": "s3", "dtn": "d1" }
        ]
    }))
    .unwrap()
}

//-----------------
// --- Admission ---
//-----------------

#[test]
fn test_idle_path_admits() {
    let (manager, _) = single_path();

    assert_eq!(manager.probe_path_rate("s1", 10e9, true).unwrap(), AdmissionStatus::Admitted);
    assert_eq!(manager.probe_path_rate("s1", 10e9, true).unwrap().code(), 1);
}

#[test]
fn test_base_load_rejects() {
    let (mut manager, _) = single_path();
    manager.create_job(&JobRequest::new("s1", "d1", 35e9, false)).unwrap();

    assert_eq!(manager.probe_path_rate("s1", 10e9, true).unwrap(), AdmissionStatus::InsufficientBandwidth);
}

#[test]
fn test_extra_load_is_preempted() {
    let (mut manager, store) = single_path();
    let job_id = manager.create_job(&JobRequest::new("s1", "d1", 35e9, true)).unwrap();

    assert_eq!(manager.probe_path_rate("s1", 10e9, true).unwrap(), AdmissionStatus::AdmittedWithEviction);

    let fragments = manager.query_path_dtns("s1", 10e9).unwrap();

    assert_eq!(fragments, vec![DtnFragment::new("d1", 10e9)]);
    assert_eq!(state_of(&manager, &job_id), JobState::MarkedForPrealloc);
    assert_eq!(store.job_states(), vec![(job_id, JobState::MarkedForPrealloc)]);
}

#[test]
fn test_split_follows_edge_order() {
    let (mut manager, _) = manager();
    add_storage(&mut manager, "s1", 50e9);
    add_dtn(&mut manager, "d1", 20e9);
    add_dtn(&mut manager, "d2", 20e9);
    wire(&mut manager, "s1", "d1", 40e9);
    wire(&mut manager, "s1", "d2", 40e9);

    assert_eq!(manager.probe_path_rate("s1", 30e9, false).unwrap(), AdmissionStatus::Admitted);

    let fragments = manager.query_path_dtns("s1", 30e9).unwrap();

    assert_eq!(fragments, vec![DtnFragment::new("d1", 20e9), DtnFragment::new("d2", 10e9)]);
}

#[test]
fn test_storage_capacity_below_rate() {
    let (mut manager, _) = single_path();

    assert_eq!(manager.probe_path_rate("s1", 60e9, false).unwrap(), AdmissionStatus::InsufficientCapacity);
    assert!(manager.query_path_dtns("s1", 60e9).unwrap().is_empty());
}

#[test]
fn test_unknown_storage_is_not_found() {
    let (mut manager, _) = single_path();

    assert!(matches!(manager.probe_path_rate("nope", 1e9, false), Err(Error::NotFound { .. })));
    assert!(matches!(manager.query_path_dtns("d1", 1e9), Err(Error::NotFound { .. })));
}

#[test]
fn test_storage_without_dtns_rejects() {
    let (mut manager, _) = manager();
    add_storage(&mut manager, "s1", 50e9);

    assert_eq!(manager.probe_path_rate("s1", 15e9, false).unwrap(), AdmissionStatus::InsufficientBandwidth);
}

#[test]
fn test_paths_below_floor_are_ignored() {
    let (mut manager, _) = manager();
    add_storage(&mut manager, "s1", 50e9);
    add_dtn(&mut manager, "d1", 500.0);
    add_dtn(&mut manager, "d2", 40e9);
    wire(&mut manager, "s1", "d1", 40e9);
    wire(&mut manager, "s1", "d2", 40e9);

    let fragments = manager.query_path_dtns("s1", 10e9).unwrap();

    assert_eq!(fragments, vec![DtnFragment::new("d2", 10e9)]);
}

#[test]
fn test_probe_is_monotone_in_rate() {
    let (mut manager, _) = single_path();
    manager.create_job(&JobRequest::new("s1", "d1", 10e9, false)).unwrap();
    manager.create_job(&JobRequest::new("s1", "d1", 15e9, true)).unwrap();

    let mut last = 0;
    for step in 1..=60 {
        let code = manager.probe_path_rate("s1", step as f64 * 1e9, false).unwrap().code();
        assert!(code >= last, "status went from {} to {} at {}e9", last, code, step);
        last = code;
    }
    assert_eq!(last, AdmissionStatus::InsufficientCapacity.code());
}

#[traced_test]
#[test]
fn test_probe_records_decision() {
    let (manager, _) = single_path();

    manager.probe_path_rate("s1", 10e9, true).unwrap();

    assert!(logs_contain("admission decision"));
    assert!(logs_contain("status=1"));
}

//------------------
// --- Preemption ---
//------------------

#[test]
fn test_eviction_takes_largest_extra_jobs_first() {
    let (mut manager, store) = single_path();
    let small = manager.create_job(&JobRequest::new("s1", "d1", 15e9, true)).unwrap();
    let large = manager.create_job(&JobRequest::new("s1", "d1", 20e9, true)).unwrap();

    let fragments = manager.query_path_dtns("s1", 30e9).unwrap();

    assert_eq!(fragments, vec![DtnFragment::new("d1", 30e9)]);
    assert_eq!(store.job_states(), vec![(large.clone(), JobState::MarkedForPrealloc), (small.clone(), JobState::MarkedForPrealloc)]);
    assert_eq!(state_of(&manager, &large), JobState::MarkedForPrealloc);
    assert_eq!(state_of(&manager, &small), JobState::MarkedForPrealloc);
}

#[test]
fn test_eviction_stops_once_clean() {
    let (mut manager, _) = single_path();
    let small = manager.create_job(&JobRequest::new("s1", "d1", 5e9, true)).unwrap();
    let large = manager.create_job(&JobRequest::new("s1", "d1", 30e9, true)).unwrap();

    manager.query_path_dtns("s1", 10e9).unwrap();

    assert_eq!(state_of(&manager, &large), JobState::MarkedForPrealloc);
    assert_eq!(state_of(&manager, &small), JobState::Running);
}

#[test]
fn test_contention_off_storage_gives_up() {
    let (mut manager, _) = manager();
    add_dtn(&mut manager, "d1", 40e9);
    add_storage(&mut manager, "s1", 100e9);
    add_storage(&mut manager, "s2", 100e9);
    wire(&mut manager, "s1", "d1", 40e9);
    wire(&mut manager, "s2", "d1", 40e9);
    let other = manager.create_job(&JobRequest::new("s2", "d1", 35e9, true)).unwrap();

    assert_eq!(manager.probe_path_rate("s1", 10e9, false).unwrap(), AdmissionStatus::AdmittedWithEviction);
    assert!(manager.query_path_dtns("s1", 10e9).unwrap().is_empty());
    assert_eq!(state_of(&manager, &other), JobState::Running);
}

#[test]
fn test_persistence_failure_does_not_block_eviction() {
    let mut manager = ResourceManager::new(Arc::new(FailingStore), BrokerConfig::default());
    add_dtn(&mut manager, "d1", 40e9);
    add_storage(&mut manager, "s1", 50e9);
    wire(&mut manager, "s1", "d1", 40e9);
    let job_id = manager.create_job(&JobRequest::new("s1", "d1", 35e9, true)).unwrap();

    let fragments = manager.query_path_dtns("s1", 10e9).unwrap();

    assert_eq!(fragments.len(), 1);
    assert_eq!(state_of(&manager, &job_id), JobState::MarkedForPrealloc);
}

#[test]
fn test_clean_admission_never_evicts() {
    let (mut manager, store) = single_path();
    manager.create_job(&JobRequest::new("s1", "d1", 10e9, true)).unwrap();

    assert_eq!(manager.probe_path_rate("s1", 20e9, false).unwrap(), AdmissionStatus::Admitted);
    manager.query_path_dtns("s1", 20e9).unwrap();

    assert!(store.job_states().is_empty());
}

fn local_transfer(storage: &str, rate: f64, is_extra: bool) -> TransferRequest {
    TransferRequest { raw_job: None, src_storage: NodeId::new(storage), dst_storage: None, rate, is_extra, dst_fragments: Vec::new() }
}

/// Running load on every storage and edge stays within its capacity.
fn assert_within_capacity(manager: &ResourceManager) {
    let ledger = manager.ledger();

    for storage in manager.graph().storage_nodes() {
        let load = storage.base.sum_base(ledger) + storage.base.sum_extra(ledger);
        assert!(load <= storage.base.capacity + 1.0, "storage {} carries {} over a capacity of {}", storage.id, load, storage.base.capacity);
    }
    for (_, edge) in manager.graph().edges() {
        let load = edge.base.sum_base(ledger) + edge.base.sum_extra(ledger);
        assert!(load <= edge.base.capacity + 1.0, "edge {} carries {} over a capacity of {}", edge.id, load, edge.base.capacity);
    }
}

#[test]
fn test_admitted_requests_are_fully_split() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let (mut manager, _) = manager();
        add_storage(&mut manager, "s", rng.random_range(10.0..100.0) * 1e9);

        for d in 0..rng.random_range(1..5) {
            let dtn = format!("d{}", d);
            add_dtn(&mut manager, &dtn, rng.random_range(1.0..40.0) * 1e9);
            wire(&mut manager, "s", &dtn, rng.random_range(1.0..40.0) * 1e9);
        }

        // earlier transfers, base ones preempting extra ones
        for _ in 0..rng.random_range(0..6) {
            let transfer = local_transfer("s", rng.random_range(0.5..20.0) * 1e9, rng.random_bool(0.5));
            manager.allocate_transfer(&transfer).unwrap();
            assert_within_capacity(&manager);
        }

        let rate = rng.random_range(1.0..60.0) * 1e9;
        let status = manager.probe_path_rate("s", rate, false).unwrap();
        let fragments = manager.query_path_dtns("s", rate).unwrap();

        if status.is_admitted() {
            let total: f64 = fragments.iter().map(|f| f.rate).sum();
            assert!((total - rate).abs() < 1.0, "split {} for a request of {}", total, rate);
            assert!(fragments.iter().all(|f| f.rate > 0.0));

            let is_extra = rng.random_bool(0.5);
            for fragment in &fragments {
                manager.create_job(&JobRequest::new("s", fragment.dtn.clone(), fragment.rate, is_extra)).unwrap();
            }
        } else {
            assert!(fragments.is_empty());
        }

        assert_within_capacity(&manager);
    }
}

#[test]
fn test_zero_rate_gets_first_usable_dtn() {
    let (mut manager, _) = manager();
    add_storage(&mut manager, "s1", 50e9);
    add_dtn(&mut manager, "d1", 500.0);
    add_dtn(&mut manager, "d2", 40e9);
    add_dtn(&mut manager, "d3", 40e9);
    wire(&mut manager, "s1", "d1", 40e9);
    wire(&mut manager, "s1", "d2", 40e9);
    wire(&mut manager, "s1", "d3", 40e9);

    assert_eq!(manager.probe_path_rate("s1", 0.0, false).unwrap(), AdmissionStatus::Admitted);
    assert_eq!(manager.query_path_dtns("s1", 0.0).unwrap(), vec![DtnFragment::new("d2", 0.0)]);
}

#[test]
fn test_zero_rate_without_usable_dtn_is_rejected() {
    let (mut manager, _) = manager();
    add_storage(&mut manager, "s1", 50e9);
    add_dtn(&mut manager, "d1", 500.0);
    wire(&mut manager, "s1", "d1", 40e9);

    assert_eq!(manager.probe_path_rate("s1", 0.0, false).unwrap(), AdmissionStatus::InsufficientBandwidth);
    assert!(manager.query_path_dtns("s1", 0.0).unwrap().is_empty());
}

//-----------------
// --- Jobs ---
//-----------------

#[test]
fn test_create_job_attaches_whole_path() {
    let (mut manager, store) = single_path();

    let job_id = manager.create_job(&JobRequest::new("s1", "d1", 5e9, false).with_raw_job("raw-1").with_destination("s9", "d9")).unwrap();
    let job_key = manager.ledger().key_of(&job_id).unwrap();

    let graph = manager.graph();
    assert!(graph.storage_node("s1").unwrap().base.jobs().any(|k| k == job_key));
    assert!(graph.dtn_node("d1").unwrap().base.jobs().any(|k| k == job_key));
    assert!(graph.gateway().unwrap().base.jobs().any(|k| k == job_key));
    assert!(graph.edge("s1", "d1").unwrap().base.jobs().any(|k| k == job_key));
    assert!(graph.edge("d1", GATEWAY_ID).unwrap().base.jobs().any(|k| k == job_key));

    let records = store.reservations();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].job_id, job_id.to_string());
    assert_eq!(records[0].raw_job.as_deref(), Some("raw-1"));
    assert_eq!(records[0].dst_dtn.as_deref(), Some("d9"));
    assert_eq!(records[0].state, JobState::Running);
}

#[test]
fn test_create_job_on_missing_edge_leaves_nothing() {
    let (mut manager, _) = single_path();
    add_dtn(&mut manager, "d2", 40e9);

    let result = manager.create_job(&JobRequest::new("s1", "d2", 5e9, false));

    assert!(matches!(result, Err(Error::NotFound { kind: "edge", .. })));
    assert!(manager.ledger().is_empty());
}

#[test]
fn test_finished_job_frees_capacity() {
    let (mut manager, _) = single_path();
    let job_id = manager.create_job(&JobRequest::new("s1", "d1", 35e9, false)).unwrap();
    assert_eq!(manager.probe_path_rate("s1", 10e9, false).unwrap(), AdmissionStatus::InsufficientBandwidth);

    manager.update_job_state(&job_id, JobState::Finished).unwrap();

    assert_eq!(manager.probe_path_rate("s1", 10e9, false).unwrap(), AdmissionStatus::Admitted);
    assert!(matches!(manager.update_job_state(&JobId::new("nope"), JobState::Finished), Err(Error::NotFound { .. })));
}

#[test]
fn test_allocate_transfer_creates_matched_flows() {
    let (mut manager, store) = manager();
    add_storage(&mut manager, "s1", 50e9);
    add_dtn(&mut manager, "d1", 20e9);
    add_dtn(&mut manager, "d2", 20e9);
    wire(&mut manager, "s1", "d1", 40e9);
    wire(&mut manager, "s1", "d2", 40e9);

    let request = TransferRequest {
        raw_job: None,
        src_storage: NodeId::new("s1"),
        dst_storage: Some(NodeId::new("remote")),
        rate: 30e9,
        is_extra: false,
        dst_fragments: vec![DtnFragment::new("r1", 15e9), DtnFragment::new("r2", 15e9)],
    };

    let flows = manager.allocate_transfer(&request).unwrap();

    let shape: Vec<(&str, Option<&str>, f64)> = flows.iter().map(|f| (f.src_dtn.as_str(), f.dst_dtn.as_ref().map(|d| d.as_str()), f.rate)).collect();
    assert_eq!(shape, vec![("d1", Some("r1"), 15e9), ("d1", Some("r2"), 5e9), ("d2", Some("r2"), 10e9)]);
    assert_eq!(store.reservations().len(), 3);
    assert_eq!(manager.probe_path_rate("s1", 15e9, false).unwrap(), AdmissionStatus::InsufficientBandwidth);
}

#[test]
fn test_allocate_local_transfer() {
    let (mut manager, _) = single_path();
    let request = TransferRequest { raw_job: None, src_storage: NodeId::new("s1"), dst_storage: None, rate: 10e9, is_extra: true, dst_fragments: Vec::new() };

    let flows = manager.allocate_transfer(&request).unwrap();

    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].dst_dtn, None);
    assert_eq!(manager.ledger().len(), 1);
}

#[test]
fn test_match_path_dtns_rejects_unequal_totals() {
    let (manager, _) = single_path();

    let result = manager.match_path_dtns(&[DtnFragment::new("d1", 10e9)], &[DtnFragment::new("r1", 5e9)]);

    assert!(matches!(result, Err(Error::InvariantViolation(_))));
}

//--------------------
// --- Construction ---
//--------------------

#[test]
fn test_construct_from_inventory() {
    let store = Arc::new(JsonSiteStore::new(inventory(), 600_000).with_fixed_time(1_000_000));
    let mut manager = ResourceManager::new(store, BrokerConfig::default());

    let summary = manager.construct().unwrap();

    // d2 expired, s3 is unknown: only s1 -> d1 survives
    assert_eq!(summary.storages, 2);
    assert_eq!(summary.dtns, 1);
    assert_eq!(summary.general_nodes, 1);
    assert_eq!(summary.edges, 2);

    let graph = manager.graph();
    assert_eq!(graph.edge("s1", "d1").unwrap().base.capacity, 4e10);
    assert_eq!(graph.edge("d1", GATEWAY_ID).unwrap().base.capacity, 40e9);
    assert_eq!(graph.storage_node("s1").unwrap().root_folder(), Some("/lustre"));
    assert_eq!(graph.dtn_node("d1").unwrap().ctrl_ip(), Some("10.0.0.1"));
    assert_eq!(manager.primary_dtn("s1").unwrap(), Some(NodeId::new("d1")));
    assert_eq!(manager.probe_path_rate("s1", 10e9, false).unwrap(), AdmissionStatus::Admitted);
}

#[test]
fn test_construct_replaces_previous_graph() {
    let store = Arc::new(JsonSiteStore::new(inventory(), 600_000).with_fixed_time(1_000_000));
    let mut manager = ResourceManager::new(store.clone(), BrokerConfig::default());
    manager.construct().unwrap();

    store.set_inventory(InventoryDto::default()).unwrap();
    let summary = manager.construct().unwrap();

    assert_eq!(summary.storages, 0);
    assert_eq!(summary.edges, 0);
    assert!(manager.graph().has_gateway());
}

#[test]
fn test_failed_construct_keeps_graph() {
    let mut manager = ResourceManager::new(Arc::new(FailingStore), BrokerConfig::default());
    add_storage(&mut manager, "s1", 50e9);

    assert!(manager.construct().is_err());
    assert!(manager.graph().has_storage_node("s1"));
}

#[test]
fn test_add_modules_in_any_order() {
    let (mut manager, _) = manager();

    let mut dtn = ModuleDto::new("d1", ModuleType::Dtn, "dtn one");
    dtn.ctrl_interface = serde_json::from_value(json!({ "ip": "10.1.1.1" })).unwrap();
    dtn.data_interfaces = serde_json::from_value(json!([{ "rate": 25e9 }])).unwrap();
    dtn.storages = vec![ModuleStorageDto { id: "s1".into(), typ: "local".into(), name: "lustre".into() }];

    let mut storage = ModuleDto::new("s1", ModuleType::LocalStorage, "lustre");
    storage.root_folder = Some("/lustre".into());

    let modules = vec![dtn, storage, ModuleDto::new("x", ModuleType::Unknown("Tape".into()), "tape")];

    let summary = manager.add_modules("agent-q", &modules);

    assert_eq!(summary.storages, 1);
    assert_eq!(summary.dtns, 1);
    assert_eq!(summary.edges, 2);
    assert!(!manager.graph().has_node("x"));
    assert_eq!(manager.graph().storage_node("s1").unwrap().base.capacity, 1e6);
    assert_eq!(manager.graph().edge("d1", GATEWAY_ID).unwrap().base.capacity, 25e9);
    assert_eq!(manager.node_queue_name("d1").unwrap(), "agent-q");
    assert_eq!(manager.primary_dtn("s1").unwrap(), Some(NodeId::new("d1")));
}

#[test]
fn test_add_modules_replaces_agents() {
    let (mut manager, _) = manager();

    manager.add_modules("q1", &[ModuleDto::new("l1", ModuleType::Launcher, "launcher"), ModuleDto::new("n1", ModuleType::Sdn, "sdn")]);
    manager.add_modules("q2", &[ModuleDto::new("l2", ModuleType::Launcher, "launcher")]);

    assert!(manager.has_launcher());
    assert!(manager.has_sdn());
    assert_eq!(manager.launcher().unwrap().id, NodeId::new("l2"));
    assert_eq!(manager.node_queue_name("l2").unwrap(), "q2");
    assert_eq!(manager.node_queue_name("n1").unwrap(), "q1");
}

#[test]
fn test_del_modules_is_tolerant() {
    let (mut manager, _) = single_path();
    manager.add_modules("q", &[ModuleDto::new("n1", ModuleType::Sdn, "sdn")]);

    let modules = vec![
        ModuleDto::new("d1", ModuleType::Dtn, "dtn one"),
        ModuleDto::new("ghost", ModuleType::Dtn, "gone already"),
        ModuleDto::new(GATEWAY_ID, ModuleType::Unknown("Gateway".into()), "gateway"),
        ModuleDto::new("n1", ModuleType::Sdn, "sdn"),
    ];

    let summary = manager.del_modules(&modules);

    assert_eq!(summary.dtns, 0);
    assert_eq!(summary.edges, 0);
    assert!(manager.graph().has_gateway());
    assert!(!manager.has_sdn());
    assert!(manager.graph().storage_node("s1").unwrap().out_edges().is_empty());
}

#[test]
fn test_del_modules_clears_primary_dtn() {
    let (mut manager, _) = manager();
    add_storage(&mut manager, "s1", 50e9);
    let mut dtn = ModuleDto::new("d1", ModuleType::Dtn, "dtn one");
    dtn.data_interfaces = serde_json::from_value(json!([{ "rate": 40e9 }])).unwrap();
    dtn.storages = vec![ModuleStorageDto { id: "s1".into(), typ: "local".into(), name: "lustre".into() }];

    manager.add_modules("q", &[dtn.clone()]);
    assert_eq!(manager.primary_dtn("s1").unwrap(), Some(NodeId::new("d1")));

    manager.del_modules(&[dtn]);

    assert!(!manager.graph().has_dtn_node("d1"));
    assert_eq!(manager.primary_dtn("s1").unwrap(), None);
}

//----------------
// --- Queries ---
//----------------

#[test]
fn test_topology_queries() {
    let store = Arc::new(JsonSiteStore::new(inventory(), 600_000).with_fixed_time(1_000_000));
    let mut manager = ResourceManager::new(store, BrokerConfig::default());
    manager.construct().unwrap();

    let storages = manager.active_storage_list();
    assert_eq!(storages.len(), 1);
    assert_eq!(storages[0]["id"], json!("s1"));
    assert_eq!(storages[0]["dtn"], json!("10.0.0.1"));

    let dtns = manager.active_dtn_list();
    assert_eq!(dtns.len(), 1);
    assert_eq!(dtns[0]["name"], json!("dtn one"));

    let topology = manager.active_dtn_topology();
    assert_eq!(topology.dtns.len(), 1);
    assert_eq!(topology.dtns[0].label, "dtn one");
    assert_eq!(topology.dtns[0].ls[0].device, "lustre");
    assert_eq!(topology.dtns[0].ls[0].roots, json!(["/lustre"]));

    let connected = manager.storage_connected_dtns("s1").unwrap();
    assert_eq!(connected.len(), 1);
    assert_eq!(connected[0].ctrl_ip, "10.0.0.1");
    assert!(manager.storage_connected_dtns("s2").unwrap().is_empty());

    assert_eq!(manager.node_queue_name("s2").unwrap(), "site-a");
    assert!(manager.node_queue_name("nope").is_err());
}
