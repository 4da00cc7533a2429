use {
    image::ImageError,
    std::io,
    video::VideoError,
};

#[test]
fn test_permission_io_error_maps_to_permission_denied() {
    let error: VideoError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
    assert!(matches!(error, VideoError::PermissionDenied(_)));
}

#[test]
fn test_other_io_errors_map_to_unavailable() {
    for kind in [io::ErrorKind::NotFound, io::ErrorKind::ResourceBusy, io::ErrorKind::Other] {
        let error: VideoError = io::Error::new(kind, "gone").into();
        assert!(matches!(error, VideoError::Unavailable(_)), "{:?}", kind);
    }
}

#[test]
fn test_image_errors_are_wrapped() {
    let error: VideoError = ImageError::Decode("bad jpeg".to_string()).into();
    assert_eq!(error, VideoError::Decode(ImageError::Decode("bad jpeg".to_string())));
    assert!(error.to_string().contains("bad jpeg"));
}
