//! # Replay Flows
//!
//! The runtime's replay path over the bundled `demos/replay.json`.

#[cfg(test)]
mod tests {
    use mn_02_contract_results::EmittedRecord;
    use mn_runtime::{replay, ReplayFile, RuntimeConfig};
    use shared_types::{EntityId, EntityKind};

    const DEMO: &str = include_str!("../../../demos/replay.json");

    fn contract(num: u64) -> EntityId {
        EntityId::of(0, 0, num, EntityKind::Contract).unwrap()
    }

    fn run(config: &RuntimeConfig) -> Vec<EmittedRecord> {
        let file = ReplayFile::from_reader(DEMO.as_bytes()).unwrap();
        let mut out = Vec::new();
        replay(config, &file, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_demo_replay() {
        let records = run(&RuntimeConfig::default());

        let kinds: Vec<&str> = records
            .iter()
            .map(|record| match record {
                EmittedRecord::Entity(_) => "entity",
                EmittedRecord::Contract(_) => "contract",
                EmittedRecord::ContractResult(_) => "result",
                EmittedRecord::ContractLog(_) => "log",
                EmittedRecord::ContractStateChange(_) => "state_change",
                EmittedRecord::ContractAction(_) => "action",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["state_change", "entity", "contract", "log", "result", "action", "result"]
        );

        let EmittedRecord::Entity(child) = &records[1] else {
            panic!("expected child entity, got {:?}", records[1]);
        };
        assert_eq!(child.id, contract(2002));
        assert_eq!(child.memo.as_deref(), Some("factory"));

        let EmittedRecord::ContractResult(call) = &records[6] else {
            panic!("expected contract result, got {:?}", records[6]);
        };
        assert_eq!(call.contract_id, contract(1500));
        assert_eq!(call.amount, Some(5));
    }

    #[test]
    fn test_demo_replay_without_results() {
        let mut config = RuntimeConfig::default();
        config.reconciler.persist_contract_results = false;
        assert!(run(&config).is_empty());
    }

    #[test]
    fn test_demo_replay_same_for_any_worker_count() {
        let single = run(&RuntimeConfig {
            workers: 1,
            ..RuntimeConfig::default()
        });
        let many = run(&RuntimeConfig {
            workers: 16,
            ..RuntimeConfig::default()
        });
        assert_eq!(single, many);
    }
}
