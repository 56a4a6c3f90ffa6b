use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nrel_processor::app::services::file_registry::FileRegistry;
use nrel_processor::{extract_jv, extract_stability};

const JV_FILE: &str = "S1_B2_D3_CU_px1_fwd_lt_lp1_01.txt";

fn jv_text(points: usize) -> String {
    let mut lines = vec![
        "// ************** HEADER START ***************".to_string(),
        "// NREL JV station export".to_string(),
    ];
    for i in 0..15 {
        lines.push(match i {
            1 => "Irradiance (100.0 mW/cm²): 1.00".to_string(),
            7 => "Cell Area (cm²): 0.13 cm²".to_string(),
            _ => format!("Field {}: {}", i, i),
        });
    }
    lines.push("// ************** HEADER END *****************".to_string());
    lines.push("Voltage\tCurrent\tPower".to_string());
    for i in 0..points {
        let v = i as f64 * 0.001;
        lines.push(format!("{}\t{}\t{}", v, v * 20.0 - 22.0, v * (v * 20.0 - 22.0)));
    }
    lines.join("\n")
}

fn stability_text(segments: usize, rows: usize) -> String {
    let mut text = String::from(
        "// ***** HEADER START *****\n// Device: S1_B2_D3\n// ***** HEADER END *****\n",
    );
    for s in 0..segments {
        text.push_str(&format!(
            "//** START TEST HEADER **\n//Timestamp: 2024-03-01 {:02}:00:00\n//Light: 1\n//PxSize: 0.1\n//Temp: 25\n//** END TEST HEADER ***\n",
            s % 24
        ));
        for r in 0..rows {
            text.push_str(&format!("-2.9\t0.95\t{}\n", s * rows + r));
        }
    }
    text
}

fn bench_extraction(c: &mut Criterion) {
    let jv = jv_text(1200);
    c.bench_function("extract_jv_1200_points", |b| {
        b.iter(|| extract_jv(black_box(&jv), JV_FILE))
    });

    let stability = stability_text(48, 200);
    c.bench_function("extract_stability_48_segments", |b| {
        b.iter(|| extract_stability(black_box(&stability)))
    });

    let registry = FileRegistry::with_defaults().expect("default patterns compile");
    c.bench_function("detect_jv", |b| {
        b.iter(|| registry.detect(black_box(JV_FILE), black_box(&jv)))
    });
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
