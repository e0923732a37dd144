//! Microbenchmarks for the marshaling path: C-string conversion, one
//! stat bridge call, and a full file-record emission.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sysbridge_core::bytes::c_string;

fn bench_c_string_marshal(c: &mut Criterion) {
    let path = b"/var/lib/some/reasonably/long/path/to/a/file.with.extension";
    c.bench_function("c_string_marshal", |b| {
        b.iter(|| c_string("bench", black_box(path.as_slice())).unwrap())
    });
}

fn bench_stat_bridge(c: &mut Criterion) {
    c.bench_function("lstat_bridge", |b| {
        b.iter(|| sysbridge_posix::fs::lstat(black_box(b"/tmp".as_slice())).unwrap())
    });
}

fn bench_file_record_emit(c: &mut Criterion) {
    let dir = std::env::temp_dir().join(format!("sysbridge_bench_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("subject");
    std::fs::write(&file, vec![0u8; 4096]).unwrap();
    let path = file.as_os_str().as_encoded_bytes().to_vec();

    c.bench_function("file_record_emit", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(256);
            sysbridge_fsdump::record::write_file_record(&mut out, black_box(&path)).unwrap();
            out
        })
    });

    let _ = std::fs::remove_dir_all(dir);
}

criterion_group!(
    benches,
    bench_c_string_marshal,
    bench_stat_bridge,
    bench_file_record_emit
);
criterion_main!(benches);
