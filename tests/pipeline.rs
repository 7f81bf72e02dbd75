use ndarray::Array2;
use rusty_image_compression::prelude::*;
use rusty_image_compression::synthetic::{random_low_rank_image, random_noise_image};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_decode_and_analyse() {
    init_logger();

    let mut bytes = b"P5\n# 100x100 ramp\n100 100\n255\n".to_vec();
    bytes.extend((0..100usize).flat_map(|i| (0..100usize).map(move |j| ((i + 2 * j) % 256) as u8)));

    let image = decode(&bytes).unwrap();
    let analysis = Pipeline::default().run(&image).unwrap();

    assert_eq!(
        analysis.ranks().collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
    );
    assert_eq!(analysis.onset_rank, Some(50));

    let record = &analysis.metrics[5];
    assert_eq!(record.rank, 10);
    assert!((record.compression_ratio.value().unwrap() - 0.799).abs() < 1E-12);

    for record in &analysis.metrics {
        assert_eq!(record.compression_ratio.is_applicable(), record.rank < 50);
    }

    let full = analysis.metrics.last().unwrap();
    assert!(full.max_absolute_error < 1E-9);
    assert!(full.relative_error < 1E-12);
}

#[test]
fn test_encode_decode_round_trip() {
    let mut rng = rand::thread_rng();

    for &max_value in &[1u16, 255, 256, 65535] {
        let image = random_noise_image((13, 7), max_value, &mut rng).unwrap();

        let bytes = encode(&image);
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.pixels(), image.pixels());
        assert_eq!(decoded.max_value(), max_value);
        assert_eq!(encode(&decoded), bytes);
    }
}

#[test]
fn test_decode_file() {
    let mut rng = rand::thread_rng();
    let image = random_noise_image((6, 9), 1023, &mut rng).unwrap();

    let path = std::env::temp_dir().join(format!("rusty-image-compression-{}.pgm", std::process::id()));
    std::fs::write(&path, encode(&image)).unwrap();
    let decoded = decode_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(decoded.unwrap(), image);
}

#[test]
fn test_decode_missing_file() {
    assert!(matches!(
        decode_file("/this/file/does/not/exist.pgm"),
        Err(ImageCompressionError::IoError(_))
    ));
}

#[test]
fn test_malformed_header_fails_before_pixels() {
    let bytes = b"P5 100 100 \n\x01\x02";

    match decode(bytes) {
        Err(ImageCompressionError::FormatError { offset, .. }) => assert_eq!(offset, 12),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_low_rank_image_is_well_approximated() {
    init_logger();
    let mut rng = rand::thread_rng();
    let image = random_low_rank_image((64, 48), 3, 255, &mut rng).unwrap();

    let analysis = Pipeline::default().run(&image).unwrap();

    // Rank 4 captures the rank 3 structure plus the rescaling offset.
    let rank_four = &analysis.metrics[3];
    assert_eq!(rank_four.rank, 4);
    assert!(rank_four.max_absolute_error < 3.0);
    assert!(rank_four.relative_error < 1E-2);

    let quantized = Image::from_matrix(analysis.reconstruct(4).unwrap().view(), 255).unwrap();
    let diff: Array2<i32> = quantized.pixels().mapv(i32::from) - &image.pixels().mapv(i32::from);
    assert!(diff.iter().all(|&d| d.abs() <= 3));
}

#[test]
fn test_factor_display_scaling() {
    let mut rng = rand::thread_rng();
    let image = random_noise_image((10, 12), 255, &mut rng).unwrap();
    let svd = decompose(&image).unwrap();

    for factor in &[svd.u.view(), svd.vt.view()] {
        let gray = rescale_to_gray(factor.view());
        let min = gray.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = gray.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min, 0.0);
        assert_eq!(max, 255.0);
        assert_eq!(gray.dim(), factor.dim());
    }
}
