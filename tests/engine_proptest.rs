use ffnorm::engine::{ResolutionClass, relocate, target_bitrate_kbps};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

proptest! {
    #[test]
    fn classification_respects_thresholds(height in 1u32..=10_000) {
        let class = ResolutionClass::from_height(height);
        let expected = if height <= 480 {
            ResolutionClass::P480
        } else if height <= 720 {
            ResolutionClass::P720
        } else if height <= 1080 {
            ResolutionClass::P1080
        } else if height <= 2160 {
            ResolutionClass::K4
        } else {
            ResolutionClass::Unknown
        };
        prop_assert_eq!(class, expected);
    }

    #[test]
    fn high_fps_is_exactly_half_again(fps in 0.1f64..=240.0) {
        for class in [
            ResolutionClass::P480,
            ResolutionClass::P720,
            ResolutionClass::P1080,
            ResolutionClass::K4,
            ResolutionClass::Unknown,
        ] {
            let base = target_bitrate_kbps(class, 24.0);
            let rated = target_bitrate_kbps(class, fps);
            if fps > 30.0 {
                prop_assert_eq!(rated, (base as f64 * 1.5).floor() as u32);
            } else {
                prop_assert_eq!(rated, base);
            }
        }
    }

    #[test]
    fn relocate_stays_under_output_root(
        segments in proptest::collection::vec("[a-z]{1,8}", 1..4),
        stem in "[a-z]{1,8}",
        ext in "(mp4|mkv|mov|avi)",
    ) {
        let root_in = PathBuf::from("/in");
        let root_out = PathBuf::from("/out");
        let mut path = root_in.clone();
        for seg in &segments {
            path.push(seg);
        }
        path.push(format!("{stem}.{ext}"));

        let output = relocate(&root_in, &root_out, &path, "mp4");

        prop_assert!(output.starts_with(&root_out));
        prop_assert_eq!(output.extension().unwrap(), "mp4");
        prop_assert_eq!(output.file_stem().unwrap().to_str().unwrap(), stem.as_str());

        // the relative directory structure is preserved exactly
        let rel = output.strip_prefix(&root_out).unwrap();
        let expected_parent: PathBuf = segments.iter().collect();
        prop_assert_eq!(rel.parent().unwrap(), Path::new(&expected_parent));
    }
}
