use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;

use automvs_core::StreamKind;
use automvs_monitor::{LineDecoder, LogOnly, SessionContext, StreamReader, WaitCondition};

/// Console traffic resembling an MVS boot, ending with the TCAS banner
fn boot_log(lines: usize) -> String {
    let mut log = String::new();
    for i in 0..lines {
        match i % 4 {
            0 => log.push_str(&format!("HHC00100I Thread id {i:08x}, prio 15, name 'cpu' started\n")),
            1 => log.push_str(&format!("\x1b[1mIEE252I MEMBER IEASYS{i:02} FOUND IN SYS1.PARMLIB\x1b[0m\n")),
            2 => log.push_str(&format!("HHC01603I ipl 150 cycle {i}\r\n")),
            _ => log.push_str(&format!("$HASP373 JOB{i:05} STARTED - INIT  1 - CLASS A - SYS MVSC\n")),
        }
    }
    log.push_str("IKT005I TCAS IS INITIALIZED\n");
    log
}

fn bench_decode(c: &mut Criterion) {
    let line = b"\x1b[1;31mHHC00809I\x1b[0m Processor CP00: disabled wait state 00020000 80000005\r\n";
    let mut decoder = LineDecoder::new();

    c.bench_function("decode_line", |b| {
        b.iter(|| decoder.decode(black_box(line)));
    });
}

fn bench_read_and_wait(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_and_wait");

    for lines in [100usize, 1_000, 10_000].iter() {
        let log = boot_log(*lines);
        let condition = WaitCondition::for_text("IKT005I").with_timeout(Duration::from_secs(5));

        group.bench_with_input(BenchmarkId::from_parameter(lines), &log, |b, log| {
            b.iter(|| {
                let ctx = Arc::new(SessionContext::new(Arc::new(LogOnly)));
                StreamReader::new(StreamKind::Primary, Arc::clone(&ctx)).run(log.as_bytes());
                black_box(ctx.wait_for(&condition))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_read_and_wait);
criterion_main!(benches);
