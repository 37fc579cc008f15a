use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn synthetic(rows: usize, channels: usize) -> (fast_outb::Samples, Vec<String>, Vec<String>) {
    let mut data = Vec::with_capacity(rows * (channels + 1));
    for r in 0..rows {
        let t = r as f64 * 0.0125;
        data.push(t);
        for c in 1..=channels {
            data.push((t * c as f64).sin() * c as f64);
        }
    }
    let samples = fast_outb::Samples::from_vec(rows, channels + 1, data).unwrap();

    let mut names = vec!["Time".to_string()];
    let mut units = vec!["s".to_string()];
    for c in 1..=channels {
        names.push(format!("Chan{c}"));
        units.push("-".to_string());
    }
    (samples, names, units)
}

pub mod read {
    use divan::Bencher;
    use fast_outb::{FileFormat, OutbReader, OutbWriter, OutbWriterOptions};
    use std::io::Cursor;

    fn get_input(format: FileFormat) -> Vec<u8> {
        let (samples, names, units) = super::synthetic(20_000, 40);
        OutbWriter::new(
            Cursor::new(Vec::new()),
            OutbWriterOptions::builder().format(format).build(),
        )
        .write(&samples, &names, &units)
        .unwrap()
        .into_inner()
    }

    #[divan::bench]
    fn open(bencher: Bencher) {
        bencher
            .with_inputs(|| get_input(FileFormat::WithoutTime))
            .bench_refs(|data| {
                divan::black_box(OutbReader::new(Cursor::new(data)).unwrap());
            });
    }

    #[divan::bench(args = [FileFormat::WithTime, FileFormat::WithoutTime, FileFormat::NoCompressWithoutTime])]
    fn decode(bencher: Bencher, format: FileFormat) {
        bencher
            .with_inputs(|| get_input(format))
            .bench_values(|data| {
                divan::black_box(fast_outb::decode(Cursor::new(data)).unwrap());
            });
    }
}

pub mod write {
    use divan::Bencher;
    use fast_outb::encode;

    #[divan::bench]
    fn encode_compressed(bencher: Bencher) {
        bencher
            .with_inputs(|| super::synthetic(20_000, 40))
            .bench_refs(|(samples, names, units)| {
                divan::black_box(encode(samples, names, units, "bench").unwrap());
            });
    }
}
