use criterion::{Criterion, criterion_group, criterion_main};
use paddock::types::{CarTelemetry, CarTelemetryPayload};
use paddock::{
    EventPayload, FieldGroups, PacketHeader, Paddock, SessionRecorder, TelemetryEvent,
};
use std::hint::black_box;

fn telemetry_event(frame: u32) -> TelemetryEvent {
    let car = CarTelemetry {
        speed: 280,
        throttle: 0.92,
        gear: 7,
        engine_rpm: 11_600,
        brakes_temperature: [400, 400, 380, 380],
        tyres_surface_temperature: [95, 95, 92, 92],
        tyres_inner_temperature: [100, 100, 97, 97],
        engine_temperature: 110,
        tyres_pressure: [21.5, 21.5, 19.5, 19.5],
        ..Default::default()
    };
    TelemetryEvent::new(
        PacketHeader::new(1, frame as f32 / 60.0, frame),
        EventPayload::CarTelemetry(CarTelemetryPayload { cars: vec![car] }),
    )
}

fn bench_row_serialization(c: &mut Criterion) {
    use paddock::FieldPlan;
    use paddock::config::groups;

    let mut group = c.benchmark_group("serialization");
    let cfg = FieldGroups::builtin();
    let plan = FieldPlan::<CarTelemetry>::new(&cfg, groups::CAR_TELEMETRY).unwrap();
    let event = telemetry_event(42);
    let EventPayload::CarTelemetry(ref payload) = event.payload else { unreachable!() };

    group.bench_function("telemetry_row", |b| {
        b.iter(|| plan.keyed_row(black_box(&event.header), black_box(&payload.cars[0])).unwrap());
    });
    group.finish();
}

fn bench_dispatch_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("recorder");
    group.sample_size(50);

    group.bench_function("dispatch_1000_telemetry_events", |b| {
        b.iter_with_setup(
            || {
                let dir = tempfile::tempdir().unwrap();
                let recorder =
                    Paddock::recorder(1, dir.path(), &FieldGroups::builtin()).unwrap();
                (dir, recorder)
            },
            |(dir, mut recorder): (tempfile::TempDir, SessionRecorder)| {
                for frame in 0..1000 {
                    recorder.dispatch(black_box(&telemetry_event(frame))).unwrap();
                }
                drop(dir);
            },
        );
    });
    group.finish();
}

criterion_group!(benches, bench_row_serialization, bench_dispatch_append);
criterion_main!(benches);
