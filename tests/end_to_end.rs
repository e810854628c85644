use load_inspector::*;
use load_inspector::postprocess::*;

const A: u64 = 0x401000;
const B: u64 = 0x401010;
const C: u64 = 0x401020;
const D: u64 = 0x401030;

fn load(pc: u64, addr: u64, width: u32, value: u64) -> TraceRecord {
    TraceRecord::Load { tid: 0, pc, addr, width, role: BaseRole::Other, value }
}

fn scenario() -> Vec<TraceRecord> {
    let mut records = vec![
        // Never attributed to the region
        load(B, 0x2000, 8, 0xff),
        TraceRecord::RoiStart { tid: 0, pc: 0x400000 },
    ];
    for _ in 0..5 {
        records.push(load(A, 0x1000, 8, 0x42));
    }
    records.push(load(B, 0x2000, 8, 0x1));
    records.push(load(B, 0x2000, 8, 0x1));
    records.push(load(B, 0x2000, 8, 0x2));
    records.push(load(C, 0x3000, 4, 0x3));
    records.push(load(D, 0x4000, 32, 0x0));
    records.push(TraceRecord::RoiStop { tid: 0, pc: 0x400100 });
    records.push(load(A, 0x1000, 8, 0x43));
    records
}

#[test]
fn stable_unstable_single_and_wide_sites() {
    let trace = BinaryTrace::from_records("scenario", &scenario());
    let insp = Inspector::new();
    replay(&trace, &insp).unwrap();

    insp.with_tracker(|t| {
        assert_eq!(t.get(A).map(|r| r.occ), Some(5));
        assert!(t.is_blacklisted(B));
        assert_eq!(t.get(C).map(|r| r.occ), Some(1));
        assert!(t.get(D).is_none() && !t.is_blacklisted(D));
    });

    let s = insp.finish();
    let b8 = SizeBucket::from_width(8);
    assert_eq!(s.loads.get(LoadKind::Reg, b8), 8);
    assert_eq!(s.trackable_loads.get(LoadKind::Reg, b8), 8);
    assert_eq!(s.loads.get(LoadKind::Reg, SizeBucket::from_width(32)), 1);
    assert_eq!(s.trackable_loads.get(LoadKind::Reg, SizeBucket::from_width(32)), 0);

    assert_eq!(s.num_sites, 3);
    assert_eq!(s.num_blacklisted, 1);
    assert_eq!(s.num_tracked, 2);
    assert_eq!(s.num_stable_sites(), 1);
    assert_eq!(s.num_stable_loads(), 5);
    assert_eq!(s.stable_sites.get(LoadKind::Reg, b8), 1);
    assert_eq!(s.ranked, vec![StableSite { pc: A, occ: 5, kind: LoadKind::Reg, size: b8 }]);
}

#[test]
fn reports_written_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.trace");
    BinaryTrace::from_records("scenario", &scenario()).write_to(&path).unwrap();

    let insp = Inspector::new();
    for trace in BinaryTraceSet::new_from_slice(&[path.display().to_string()]) {
        replay(&trace.unwrap(), &insp).unwrap();
    }

    let cfg = InspectorConfig {
        stats_path: dir.path().join("stats.txt"),
        dump_stable_loads: true,
        stable_loads_path: dir.path().join("ips.txt"),
    };
    write_reports(&insp.finish(), &cfg).unwrap();

    let dump = std::fs::read_to_string(&cfg.stable_loads_path).unwrap();
    assert_eq!(dump, "stable_load_ip,occurence,load_type\n0x401000,5,REG\n");

    let stats = StatsFile::from_file(&cfg.stats_path).unwrap();
    assert_eq!(stats.get("load.total"), Some(10));
    assert_eq!(stats.get("trackable_load.total"), Some(9));
    assert_eq!(stats.get("load.REG.32B"), Some(1));
    assert_eq!(stats.get("load_ips.total"), Some(3));
    assert_eq!(stats.get("stable_load_ips.REG.8B"), Some(1));
    assert_eq!(stats.get("stable_loads.total"), Some(5));
    assert_eq!(breakdowns(&stats).unwrap().len(), 5);
}
