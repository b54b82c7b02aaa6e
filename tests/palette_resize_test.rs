//! Palette extraction and resizing from files on disk.

mod common;

use common::{assert_png, fixtures, TestApp};
use fixtures::colors;
use image::ImageFormat;
use pretty_assertions::assert_eq;
use tilekit::error::{InputError, ToolError};
use tilekit::models::ResizeFilter;
use tilekit::rendering::encode;
use tilekit::services::{ResizeMode, ResizeRequest};

#[tokio::test]
async fn test_palette_of_two_colour_image() {
    let app = TestApp::new();
    let image = fixtures::two_tone(100, 40, 75, colors::RED, colors::BLUE);
    let input = app.write_png("flag.png", &image);

    let palette = app.state.palette(&input, None).await.unwrap();

    assert_eq!(palette.len(), 2);
    assert_eq!(palette[0].hex, "#FF0000");
    assert_eq!(palette[1].hex, "#0000FF");
    assert!((palette[0].share - 0.75).abs() < 1e-9);
    assert!((palette[1].share - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_palette_count_and_json_shape() {
    let app = TestApp::new();
    let input = app.write_png("quad.png", &fixtures::quadrants(40, 40));

    let palette = app.state.palette(&input, Some(3)).await.unwrap();
    assert_eq!(palette.len(), 3);
    // Four equal quadrants: ordered by hex when counts tie
    let hexes: Vec<&str> = palette.iter().map(|c| c.hex.as_str()).collect();
    assert_eq!(hexes, vec!["#0000FF", "#00FF00", "#FF0000"]);

    let json = serde_json::to_value(&palette).unwrap();
    assert_eq!(json[0]["rgb"], serde_json::json!([0, 0, 255]));
    assert_eq!(json[0]["share"], 0.25);
}

#[tokio::test]
async fn test_palette_rejects_zero_colours() {
    let app = TestApp::new();
    let input = app.write_png("quad.png", &fixtures::quadrants(4, 4));

    let err = app.state.palette(&input, Some(0)).await.unwrap_err();

    assert!(matches!(err, ToolError::Input(InputError::InvalidArgument(_))));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_resize_fit_into_output_dir() {
    let app = TestApp::new();
    let input = app.write_png("wide.png", &fixtures::quadrants(200, 100));

    let path = app
        .state
        .resize_to_file(&input, ResizeRequest::fit(50, 50), Some(&app.out_dir()))
        .await
        .unwrap();

    assert_eq!(path, app.out_dir().join("wide_50x25.png"));
    let resized = assert_png(&std::fs::read(&path).unwrap());
    assert_eq!(resized.dimensions(), (50, 25));
}

#[tokio::test]
async fn test_resize_exact_with_nearest_filter_keeps_colours() {
    let app = TestApp::new();
    let input = app.write_png("quad.png", &fixtures::quadrants(64, 64));
    let request = ResizeRequest {
        width: Some(8),
        height: Some(4),
        mode: ResizeMode::Exact,
        filter: Some(ResizeFilter::Nearest),
    };

    let path = app
        .state
        .resize_to_file(&input, request, Some(&app.out_dir()))
        .await
        .unwrap();

    let resized = assert_png(&std::fs::read(&path).unwrap());
    assert_eq!(resized.dimensions(), (8, 4));
    assert_eq!(resized.get_pixel(0, 0), &colors::RED);
    assert_eq!(resized.get_pixel(7, 3), &colors::WHITE);
}

#[tokio::test]
async fn test_resize_single_dimension_keeps_jpeg() {
    let app = TestApp::new();
    let jpeg = encode(
        &image::DynamicImage::ImageRgb8(fixtures::quadrants(120, 90)),
        ImageFormat::Jpeg,
    )
    .unwrap();
    let input = app.write_file("holiday.jpeg", &jpeg);
    let request = ResizeRequest {
        width: Some(40),
        ..Default::default()
    };

    let path = app
        .state
        .resize_to_file(&input, request, Some(&app.out_dir()))
        .await
        .unwrap();

    assert_eq!(path, app.out_dir().join("holiday_40x30.jpeg"));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn test_resize_requires_a_dimension() {
    let app = TestApp::new();
    let input = app.write_png("quad.png", &fixtures::quadrants(4, 4));

    let err = app
        .state
        .resize_to_file(&input, ResizeRequest::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Input(InputError::InvalidArgument(_))));
}
