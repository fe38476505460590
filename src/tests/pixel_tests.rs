//! tests/pixel_tests.rs

#[cfg(test)]
mod tests {
    use crate::services::pixel_service::{PixelEmbedder, TRANSPARENT_GIF};

    #[test]
    fn test_callback_url_shape() {
        let embedder = PixelEmbedder::new("http://tracker.local/track");
        let url = embedder.callback_url("abc-123");
        assert_eq!(url, "http://tracker.local/track?id=abc-123&action=open");
    }

    #[test]
    fn test_token_is_urlencoded() {
        let embedder = PixelEmbedder::new("http://tracker.local/track");
        let url = embedder.callback_url("a b/c");
        assert_eq!(url, "http://tracker.local/track?id=a%20b%2Fc&action=open");
    }

    #[test]
    fn test_embed_markup_is_invisible_img() {
        let embedder = PixelEmbedder::new("http://tracker.local/track");
        let markup = embedder.embed("tok");

        assert!(markup.starts_with("<img "));
        assert!(markup.contains(r#"src="http://tracker.local/track?id=tok&action=open""#));
        assert!(markup.contains(r#"width="1""#));
        assert!(markup.contains(r#"height="1""#));
        assert!(markup.contains("display:none"));
    }

    #[test]
    fn test_transparent_gif_is_wellformed() {
        // Header GIF89a, dimensiones 1x1 y trailer 0x3B
        assert_eq!(TRANSPARENT_GIF.len(), 43);
        assert_eq!(&TRANSPARENT_GIF[0..6], b"GIF89a");
        assert_eq!(&TRANSPARENT_GIF[6..10], &[0x01, 0x00, 0x01, 0x00]);
        assert_eq!(TRANSPARENT_GIF[42], 0x3B);
    }
}
