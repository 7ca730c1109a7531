//! Transformation URLs, built by splicing a parameter segment after the
//! `upload` path segment of a hosted file URL.

/// Parameters of a delivery transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformation {
    pub width: &'static str,
    pub height: &'static str,
    pub crop: &'static str,
    pub quality: &'static str,
    pub format: &'static str,
}

impl Transformation {
    /// Small card preview.
    pub const PREVIEW: Self = Self {
        width: "300",
        height: "200",
        crop: "fill",
        quality: "80",
        format: "auto",
    };

    /// Full-screen view.
    pub const MODAL: Self = Self {
        width: "800",
        height: "600",
        crop: "limit",
        quality: "auto",
        format: "auto",
    };

    pub fn segment(&self) -> String {
        format!(
            "w_{},h_{},c_{},q_{},f_{}",
            self.width, self.height, self.crop, self.quality, self.format
        )
    }
}

/// First-page JPG thumbnail of a PDF.
const PDF_THUMBNAIL: &str = "w_300,h_400,c_fill,f_jpg,pg_1";

/// PDFs are stored as raw files and cannot be transformed.
pub fn is_pdf_url(url: &str) -> bool {
    url.contains("/raw/upload/") || url.contains(".pdf")
}

/// `url` with `transformation` applied. PDFs and URLs without an `upload`
/// segment are returned unchanged.
pub fn transformed_url(url: &str, transformation: &Transformation) -> String {
    if is_pdf_url(url) {
        return url.to_string();
    }

    let parts: Vec<&str> = url.split('/').collect();
    let Some(upload_index) = parts.iter().position(|p| *p == "upload") else {
        return url.to_string();
    };

    let segment = transformation.segment();
    let mut spliced = Vec::with_capacity(parts.len() + 1);
    spliced.extend_from_slice(&parts[..=upload_index]);
    spliced.push(segment.as_str());
    spliced.extend_from_slice(&parts[upload_index + 1..]);
    spliced.join("/")
}

pub fn preview_url(url: &str) -> String {
    transformed_url(url, &Transformation::PREVIEW)
}

pub fn modal_url(url: &str) -> String {
    transformed_url(url, &Transformation::MODAL)
}

/// Thumbnail of a hosted PDF's first page, `None` for anything else.
pub fn pdf_thumbnail_url(url: &str, host_domain: &str) -> Option<String> {
    if !url.contains(host_domain) || !url.contains(".pdf") {
        return None;
    }
    let (head, tail) = url.split_once("/upload/")?;
    if tail.contains("/upload/") {
        return None;
    }
    Some(format!("{head}/upload/{PDF_THUMBNAIL}/{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = "https://res.cloudinary.com/demo/image/upload/v1/cafeteria-menus/menu.png";
    const PDF: &str = "https://res.cloudinary.com/demo/raw/upload/v1/cafeteria-menus/menu.pdf";

    #[test]
    fn test_preview_splices_after_upload() {
        assert_eq!(
            preview_url(IMAGE),
            "https://res.cloudinary.com/demo/image/upload/w_300,h_200,c_fill,q_80,f_auto/v1/cafeteria-menus/menu.png"
        );
    }

    #[test]
    fn test_modal() {
        assert!(modal_url(IMAGE).contains("/upload/w_800,h_600,c_limit,q_auto,f_auto/v1/"));
    }

    #[test]
    fn test_pdf_and_foreign_urls_untouched() {
        assert_eq!(preview_url(PDF), PDF);
        assert_eq!(preview_url("https://example.com/menu.png"), "https://example.com/menu.png");
    }

    #[test]
    fn test_modal_segment() {
        assert_eq!(Transformation::MODAL.segment(), "w_800,h_600,c_limit,q_auto,f_auto");
    }

    #[test]
    fn test_pdf_thumbnail() {
        assert_eq!(
            pdf_thumbnail_url(PDF, "cloudinary.com").as_deref(),
            Some("https://res.cloudinary.com/demo/raw/upload/w_300,h_400,c_fill,f_jpg,pg_1/v1/cafeteria-menus/menu.pdf")
        );
        assert_eq!(pdf_thumbnail_url(IMAGE, "cloudinary.com"), None);
        assert_eq!(pdf_thumbnail_url("https://other.net/upload/a.pdf", "cloudinary.com"), None);
    }
}
