use std::convert::Infallible;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use survey_report::render::DocumentBackend;

use crate::report::fonts::{text_width, to_winansi, wrap_text, FontStyle};
use crate::report::*;

// A4 portrait, in points.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MM: f32 = 72.0 / 25.4;

const MARGIN: f32 = 10.0 * MM;
const BOTTOM_MARGIN: f32 = 20.0 * MM;
// Space between the border of a cell and its text.
const CELL_PADDING: f32 = 1.0 * MM;
// The body starts below the logo band on every page.
const BODY_TOP: f32 = 40.0 * MM;

const LOGO_X: f32 = 10.0 * MM;
const LOGO_Y: f32 = 8.0 * MM;
const LOGO_WIDTH: f32 = 33.0 * MM;
const LOGO_NAME: &[u8] = b"Im1";

const METADATA_FONT_SIZE: f32 = 12.0;
const METADATA_LABEL_WIDTH: f32 = 55.0 * MM;
const METADATA_LINE_HEIGHT: f32 = 10.0 * MM;

const SECTION_FONT_SIZE: f32 = 12.0;
const SECTION_LINE_HEIGHT: f32 = 10.0 * MM;
const SECTION_GAP: f32 = 4.0 * MM;

const QUESTION_FONT_SIZE: f32 = 10.0;
const QUESTION_LINE_HEIGHT: f32 = 6.0 * MM;
const QUESTION_GAP: f32 = 4.0 * MM;

/// A decoded logo, ready to be embedded as an image.
#[derive(Debug, Clone)]
pub struct Logo {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl Logo {
    /// Decodes a PNG or JPEG image.
    pub fn from_bytes(data: &[u8]) -> Result<Logo, image::ImageError> {
        let decoded = image::load_from_memory(data)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
        let rgb: Vec<u8> = rgba
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let alpha = if has_alpha {
            Some(rgba.pixels().map(|p| p.0[3]).collect())
        } else {
            None
        };
        Ok(Logo {
            width,
            height,
            rgb,
            alpha,
        })
    }

    fn display_height(&self) -> f32 {
        if self.width == 0 {
            0.0
        } else {
            LOGO_WIDTH * self.height as f32 / self.width as f32
        }
    }
}

/// Lays a report out on A4 pages with the standard Helvetica fonts.
///
/// Every page starts with the logo band. The pages are kept in memory and the
/// file is only produced by `finish`.
pub struct PdfBackend {
    labels: Labels,
    title: String,
    logo: Option<Logo>,
    pages: Vec<Content>,
    // Distance from the top of the current page, in points.
    y: f32,
}

impl PdfBackend {
    pub fn new(labels: &Labels, title: &str, logo: Option<Logo>) -> PdfBackend {
        PdfBackend {
            labels: labels.clone(),
            title: title.to_string(),
            logo,
            pages: Vec::new(),
            y: BODY_TOP,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn new_page(&mut self) {
        let mut content = Content::new();
        if let Some(logo) = &self.logo {
            let h = logo.display_height();
            content.save_state();
            content.transform([LOGO_WIDTH, 0.0, 0.0, h, LOGO_X, PAGE_HEIGHT - LOGO_Y - h]);
            content.x_object(Name(LOGO_NAME));
            content.restore_state();
        }
        self.pages.push(content);
        self.y = BODY_TOP;
        debug!("PdfBackend: page {}", self.pages.len());
    }

    fn current(&mut self) -> &mut Content {
        if self.pages.is_empty() {
            self.new_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn ensure_space(&mut self, h: f32) {
        if self.pages.is_empty() || self.y + h > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.new_page();
        }
    }

    // Writes one line of text in a cell of height h whose top is the cursor.
    // The text is vertically centered in the cell.
    fn text_at(&mut self, x: f32, h: f32, text: &str, style: FontStyle, size: f32) {
        let baseline = PAGE_HEIGHT - (self.y + h / 2.0 + 0.3 * size);
        let encoded = to_winansi(text);
        let content = self.current();
        content.begin_text();
        content.set_font(Name(style.resource_name()), size);
        content.next_line(x, baseline);
        content.show(Str(&encoded));
        content.end_text();
    }

    // Wrapped text over the full width of the page, one cell per line.
    fn multi_cell(&mut self, text: &str, style: FontStyle, size: f32, h: f32) {
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_PADDING;
        for line in wrap_text(text, style, size, max_width) {
            self.ensure_space(h);
            self.text_at(MARGIN + CELL_PADDING, h, &line, style, size);
            self.y += h;
        }
    }

    fn metadata_line(&mut self, label: &str, value: &str) {
        self.ensure_space(METADATA_LINE_HEIGHT);
        self.text_at(
            MARGIN + CELL_PADDING,
            METADATA_LINE_HEIGHT,
            label,
            FontStyle::Bold,
            METADATA_FONT_SIZE,
        );
        self.text_at(
            MARGIN + METADATA_LABEL_WIDTH + CELL_PADDING,
            METADATA_LINE_HEIGHT,
            value,
            FontStyle::Regular,
            METADATA_FONT_SIZE,
        );
        self.y += METADATA_LINE_HEIGHT;
    }

    /// Assembles the document.
    pub fn finish(self) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();
        let regular_id = alloc();
        let bold_id = alloc();

        for (style, id) in [(FontStyle::Regular, regular_id), (FontStyle::Bold, bold_id)] {
            pdf.type1_font(id)
                .base_font(Name(style.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let logo_id = self
            .logo
            .as_ref()
            .map(|logo| embed_logo(&mut pdf, logo, &mut alloc));

        let page_refs: Vec<(Ref, Ref)> = (0..self.pages.len()).map(|_| (alloc(), alloc())).collect();

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_refs.iter().map(|p| p.0))
            .count(page_refs.len() as i32);
        pdf.document_info(info_id)
            .title(TextStr(&self.title))
            .creator(TextStr("surveypdf"));

        for (content, (page_id, content_id)) in self.pages.into_iter().zip(page_refs) {
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
            pdf.stream(content_id, &compressed)
                .filter(Filter::FlateDecode);

            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
                .parent(pages_id)
                .contents(content_id);
            let mut resources = page.resources();
            resources
                .fonts()
                .pair(Name(FontStyle::Regular.resource_name()), regular_id)
                .pair(Name(FontStyle::Bold.resource_name()), bold_id);
            if let Some(id) = logo_id {
                resources.x_objects().pair(Name(LOGO_NAME), id);
            }
        }

        pdf.finish()
    }
}

fn embed_logo(pdf: &mut Pdf, logo: &Logo, alloc: &mut dyn FnMut() -> Ref) -> Ref {
    let xobj_ref = alloc();
    let smask_ref = logo.alpha.as_ref().map(|alpha| {
        let mask_ref = alloc();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(alpha, 6);
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(logo.width as i32);
        mask.height(logo.height as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        mask_ref
    });

    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&logo.rgb, 6);
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(logo.width as i32);
    xobj.height(logo.height as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    xobj_ref
}

impl DocumentBackend for PdfBackend {
    type Error = Infallible;

    fn draw_header(&mut self) -> Result<(), Infallible> {
        self.new_page();
        Ok(())
    }

    fn draw_metadata(&mut self, generation_date: &str, reviewer: &str) -> Result<(), Infallible> {
        let generation_label = self.labels.generation_date.to_string();
        let reviewer_label = self.labels.reviewer.to_string();
        self.metadata_line(&generation_label, generation_date);
        self.y += 5.0 * MM;
        self.metadata_line(&reviewer_label, reviewer);
        self.y += 10.0 * MM;
        Ok(())
    }

    fn draw_section_title(&mut self, title: &str) -> Result<(), Infallible> {
        let text = format!("{}{}", self.labels.section_prefix, title);
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_PADDING;
        let lines = wrap_text(&text, FontStyle::Bold, SECTION_FONT_SIZE, max_width);
        // A title never ends a page: it moves with the first line of its question.
        let needed =
            lines.len() as f32 * SECTION_LINE_HEIGHT + SECTION_GAP + QUESTION_LINE_HEIGHT;
        self.ensure_space(needed);
        for line in lines {
            let w = text_width(&line, FontStyle::Bold, SECTION_FONT_SIZE);
            let x = ((PAGE_WIDTH - w) / 2.0).max(MARGIN + CELL_PADDING);
            self.ensure_space(SECTION_LINE_HEIGHT);
            self.text_at(x, SECTION_LINE_HEIGHT, &line, FontStyle::Bold, SECTION_FONT_SIZE);
            self.y += SECTION_LINE_HEIGHT;
        }
        self.y += SECTION_GAP;
        Ok(())
    }

    fn draw_question_block(
        &mut self,
        number: &str,
        question: &str,
        response: &str,
    ) -> Result<(), Infallible> {
        self.multi_cell(
            &format!("{} - {}", number, question),
            FontStyle::Bold,
            QUESTION_FONT_SIZE,
            QUESTION_LINE_HEIGHT,
        );
        self.multi_cell(
            response,
            FontStyle::Regular,
            QUESTION_FONT_SIZE,
            QUESTION_LINE_HEIGHT,
        );
        self.y += QUESTION_GAP;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_report::builder::RecordSetBuilder;
    use survey_report::render::render;
    use survey_report::{compile, Schema};

    fn png_bytes(alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, alpha]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn document(rows: usize) -> CompiledDocument {
        let mut b = RecordSetBuilder::for_schema(Schema::Primary);
        for i in 0..rows {
            b.add_entry(
                if i < rows / 2 { "Dados" } else { "Riscos" },
                i as i64 + 1,
                "Qual é a finalidade do tratamento dos dados pessoais coletados?",
                Some("Execução de contrato e cumprimento de obrigação legal"),
                "Ana",
            );
        }
        compile(&b.build()).unwrap()
    }

    #[test]
    fn single_page() {
        let mut backend = PdfBackend::new(&Labels::PORTUGUESE, "Relatório", None);
        render(&document(3), &mut backend).unwrap();
        assert_eq!(backend.page_count(), 1);
        let bytes = backend.finish();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
        assert!(!contains(&bytes, b"/Im1"));
    }

    #[test]
    fn long_documents_break_pages() {
        let mut backend = PdfBackend::new(&Labels::PORTUGUESE, "Relatório", None);
        render(&document(120), &mut backend).unwrap();
        assert!(backend.page_count() > 1);
        let bytes = backend.finish();
        assert!(contains(&bytes, b"/Count"));
    }

    #[test]
    fn logo_on_every_page() {
        let logo = Logo::from_bytes(&png_bytes(255)).unwrap();
        assert!(logo.alpha.is_none());
        assert!((logo.display_height() - LOGO_WIDTH / 2.0).abs() < 1e-3);
        let mut backend = PdfBackend::new(&Labels::PORTUGUESE, "Relatório", Some(logo));
        render(&document(120), &mut backend).unwrap();
        let bytes = backend.finish();
        assert!(contains(&bytes, b"/Im1"));
        assert!(contains(&bytes, b"/XObject"));
    }

    #[test]
    fn transparent_logo_has_mask() {
        let logo = Logo::from_bytes(&png_bytes(128)).unwrap();
        assert_eq!(logo.alpha.as_ref().map(|a| a.len()), Some(8));
        let mut backend = PdfBackend::new(&Labels::ENGLISH, "Report", Some(logo));
        render(&document(1), &mut backend).unwrap();
        assert!(contains(&backend.finish(), b"/SMask"));
    }

    #[test]
    fn title_moves_with_its_question() {
        let mut backend = PdfBackend::new(&Labels::PORTUGUESE, "Relatório", None);
        backend.draw_header().unwrap();
        // Room for the title line, not for the question below it.
        backend.y = PAGE_HEIGHT - BOTTOM_MARGIN - SECTION_LINE_HEIGHT - 1.0;
        backend.draw_section_title("Dados").unwrap();
        assert_eq!(backend.page_count(), 2);
        assert!((backend.y - (BODY_TOP + SECTION_LINE_HEIGHT + SECTION_GAP)).abs() < 1e-3);
    }

    #[test]
    fn long_titles_wrap() {
        let title = "Tratamento de dados pessoais sensíveis ".repeat(6);
        let text = format!("{}{}", Labels::PORTUGUESE.section_prefix, title);
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_PADDING;
        let lines = wrap_text(&text, FontStyle::Bold, SECTION_FONT_SIZE, max_width);
        assert!(lines.len() > 1);
        assert!(lines
            .iter()
            .all(|l| text_width(l, FontStyle::Bold, SECTION_FONT_SIZE) <= max_width));

        let mut backend = PdfBackend::new(&Labels::PORTUGUESE, "Relatório", None);
        backend.draw_header().unwrap();
        backend.draw_section_title(&title).unwrap();
        assert_eq!(backend.page_count(), 1);
        let expected = BODY_TOP + lines.len() as f32 * SECTION_LINE_HEIGHT + SECTION_GAP;
        assert!((backend.y - expected).abs() < 1e-3);
    }

    #[test]
    fn invalid_logo() {
        assert!(Logo::from_bytes(b"not an image").is_err());
    }
}
