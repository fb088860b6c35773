//! End-to-end pipeline scenarios against scripted and HTTP fragment sources.

use std::sync::Arc;
use std::time::Duration;

use stitch_codec::ColorType;
use stitch_fetch::HttpFetcher;
use stitch_pipeline::{Pipeline, PipelineConfig, PipelineError, StripGeometry, MAX_FETCH_ATTEMPTS};
use stitch_testkit::{strip_png, strip_raster, MockFragmentServer, ScriptedFetcher};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn config(geometry: StripGeometry, buffer: usize, producers: usize, consumers: usize) -> PipelineConfig {
    PipelineConfig {
        buffer_size: buffer,
        num_producers: producers,
        num_consumers: consumers,
        geometry,
        ..PipelineConfig::default()
    }
}

fn solid_bodies(geometry: StripGeometry, colors: &[[u8; 4]]) -> Vec<Vec<u8>> {
    colors
        .iter()
        .map(|&rgba| strip_png(geometry.width, geometry.height, rgba))
        .collect()
}

#[tokio::test]
async fn four_strips_assemble_in_sequence_order() {
    let geometry = StripGeometry {
        width: 400,
        height: 6,
        total: 4,
    };
    let colors = [RED, GREEN, BLUE, WHITE];
    let fetcher = Arc::new(ScriptedFetcher::new(solid_bodies(geometry, &colors)));

    let result = Pipeline::new(config(geometry, 2, 2, 2), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(result.elapsed > Duration::ZERO);
    assert!(result.abandoned.is_empty());
    assert_eq!(result.png.width(), 400);
    assert_eq!(result.png.height(), 24);
    assert_eq!(result.png.color_type(), ColorType::Rgba);

    // Rows 0-5 red, 6-11 green, 12-17 blue, 18-23 white.
    let expected: Vec<u8> = colors
        .iter()
        .flat_map(|&rgba| strip_raster(geometry.width, geometry.height, rgba))
        .collect();
    assert_eq!(result.png.inflate_idat().unwrap(), expected);
}

#[tokio::test]
async fn single_slot_queue_and_single_workers_complete() {
    let geometry = StripGeometry {
        width: 8,
        height: 2,
        total: 8,
    };
    let colors: Vec<[u8; 4]> = (0..8u8).map(|i| [i, i, i, 255]).collect();
    let fetcher = Arc::new(ScriptedFetcher::new(solid_bodies(geometry, &colors)));

    let result = Pipeline::new(config(geometry, 1, 1, 1), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    let expected: Vec<u8> = colors
        .iter()
        .flat_map(|&rgba| strip_raster(geometry.width, geometry.height, rgba))
        .collect();
    assert_eq!(result.png.inflate_idat().unwrap(), expected);
}

#[tokio::test]
async fn transient_fetch_failure_is_retried_to_success() {
    let geometry = StripGeometry {
        width: 4,
        height: 2,
        total: 4,
    };
    let fetcher = Arc::new(
        ScriptedFetcher::new(solid_bodies(geometry, &[RED, GREEN, BLUE, WHITE]))
            .fail_times(1, MAX_FETCH_ATTEMPTS - 1),
    );

    let result = Pipeline::new(
        config(geometry, 2, 2, 2),
        Arc::clone(&fetcher) as Arc<dyn stitch_fetch::FragmentFetcher>,
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    assert_eq!(result.png.height(), geometry.image_height());
    // Part 1 was asked for once per attempt.
    let attempts = fetcher.requests().iter().filter(|&&p| p == 1).count();
    assert_eq!(attempts, MAX_FETCH_ATTEMPTS as usize);
}

#[tokio::test]
async fn persistently_failing_fragment_is_reported_missing() {
    let geometry = StripGeometry {
        width: 4,
        height: 2,
        total: 4,
    };
    let fetcher = Arc::new(
        ScriptedFetcher::new(solid_bodies(geometry, &[RED, GREEN, BLUE, WHITE]))
            .fail_times(2, MAX_FETCH_ATTEMPTS),
    );

    // The run must terminate rather than hang on the lost fragment.
    let err = Pipeline::new(config(geometry, 2, 2, 2), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    match err {
        PipelineError::Incomplete { missing } => assert_eq!(missing, vec![2]),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn misdelivered_sequence_is_abandoned() {
    let geometry = StripGeometry {
        width: 4,
        height: 2,
        total: 2,
    };
    let fetcher =
        Arc::new(ScriptedFetcher::new(solid_bodies(geometry, &[RED, GREEN])).misdeliver(1, 0));

    let err = Pipeline::new(config(geometry, 1, 1, 1), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Incomplete { missing } if missing == vec![1]
    ));
}

#[tokio::test]
async fn unparsable_fragment_is_reported_missing() {
    let geometry = StripGeometry {
        width: 4,
        height: 2,
        total: 3,
    };
    let mut bodies = solid_bodies(geometry, &[RED, GREEN, BLUE]);
    bodies[1] = b"definitely not a png".to_vec();
    let fetcher = Arc::new(ScriptedFetcher::new(bodies));

    let err = Pipeline::new(config(geometry, 2, 2, 2), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Incomplete { missing } if missing == vec![1]
    ));
}

#[tokio::test]
async fn consumer_delay_slows_the_run() {
    let geometry = StripGeometry {
        width: 4,
        height: 2,
        total: 2,
    };
    let fetcher = Arc::new(ScriptedFetcher::new(solid_bodies(geometry, &[RED, GREEN])));
    let config = PipelineConfig {
        consumer_delay_ms: 10,
        num_consumers: 1,
        geometry,
        ..PipelineConfig::default()
    };

    let result = Pipeline::new(config, fetcher).unwrap().run().await.unwrap();
    assert!(result.elapsed >= Duration::from_millis(20));
}

#[tokio::test]
async fn http_end_to_end_assembles_the_image() {
    let geometry = StripGeometry {
        width: 6,
        height: 3,
        total: 3,
    };
    let colors = [RED, GREEN, BLUE];

    let server = MockFragmentServer::start().await;
    server.serve_image(1, solid_bodies(geometry, &colors)).await;
    let fetcher = Arc::new(HttpFetcher::new(server.endpoint()).unwrap());

    let config = PipelineConfig {
        geometry,
        ..PipelineConfig::default()
    };
    let result = Pipeline::new(config, fetcher).unwrap().run().await.unwrap();

    let expected: Vec<u8> = colors
        .iter()
        .flat_map(|&rgba| strip_raster(geometry.width, geometry.height, rgba))
        .collect();
    assert_eq!(result.png.inflate_idat().unwrap(), expected);
}
