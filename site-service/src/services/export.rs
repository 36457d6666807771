//! Contact submissions rendered as downloadable PDF and Excel reports.
//!
//! Both formats carry the same three parts: a title naming the company, the
//! export time and one row per contact, newest first.

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, XlsxError};
use thiserror::Error;

use crate::models::Contact;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Upper bound on rows in one export.
pub const EXPORT_LIMIT: u64 = 1000;

const COLUMNS: [&str; 6] = ["Name", "Email", "Phone", "Service", "Comment", "Date"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] XlsxError),
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

/// Title, timestamp and rows shared by both renderers.
#[derive(Debug, Clone)]
pub struct ContactReport {
    pub title: String,
    pub exported_at: DateTime<Utc>,
    pub contacts: Vec<Contact>,
}

impl ContactReport {
    pub fn new(company_name: &str, contacts: Vec<Contact>) -> Self {
        Self {
            title: format!("{company_name} - Contact Submissions"),
            exported_at: Utc::now(),
            contacts,
        }
    }

    pub fn exported_on(&self) -> String {
        format!("Exported on: {}", self.exported_at.format("%Y-%m-%d %H:%M UTC"))
    }

    /// `contacts_<timestamp>.<extension>`
    pub fn filename(&self, extension: &str) -> String {
        format!(
            "contacts_{}.{extension}",
            self.exported_at.format("%Y%m%d_%H%M%S")
        )
    }

    fn row(contact: &Contact) -> [String; 6] {
        [
            contact.name.clone(),
            contact.email.clone(),
            contact.phone.clone(),
            contact.service.clone(),
            contact.comment.clone(),
            contact.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Contacts")?;

        let title = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center)
            .set_background_color(Color::RGB(0x00D9FF));
        let stamp = Format::new().set_italic().set_align(FormatAlign::Center);
        let header = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x333333))
            .set_align(FormatAlign::Center);

        let last_col = (COLUMNS.len() - 1) as u16;
        sheet.merge_range(0, 0, 0, last_col, &self.title, &title)?;
        sheet.merge_range(1, 0, 1, last_col, &self.exported_on(), &stamp)?;

        for (col, name) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(3, col as u16, *name, &header)?;
        }
        for (i, contact) in self.contacts.iter().enumerate() {
            let row = 4 + i as u32;
            for (col, value) in Self::row(contact).into_iter().enumerate() {
                sheet.write_string(row, col as u16, value)?;
            }
        }
        for (col, width) in [20, 30, 15, 25, 40, 18].into_iter().enumerate() {
            sheet.set_column_width(col as u16, width)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    pub fn to_pdf(&self) -> Result<Vec<u8>, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            self.title.as_str(),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Contacts",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;

        let mut canvas = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT - MARGIN;
        canvas.use_text(self.title.as_str(), 18.0, Mm(MARGIN), Mm(y), &bold);
        y -= 8.0;
        canvas.use_text(self.exported_on(), 10.0, Mm(MARGIN), Mm(y), &regular);
        y -= 12.0;

        if self.contacts.is_empty() {
            canvas.use_text(
                "No contact submissions available.",
                10.0,
                Mm(MARGIN),
                Mm(y),
                &regular,
            );
        } else {
            draw_header(&canvas, &bold, y);
            y -= ROW_HEIGHT;
            for contact in &self.contacts {
                if y < MARGIN {
                    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Contacts");
                    canvas = doc.get_page(page).get_layer(layer);
                    y = PAGE_HEIGHT - MARGIN;
                    draw_header(&canvas, &bold, y);
                    y -= ROW_HEIGHT;
                }
                let cells = Self::row(contact);
                for ((x, max), text) in PDF_COLUMNS.iter().zip(cells.iter()) {
                    canvas.use_text(clip(text, *max), 9.0, Mm(*x), Mm(y), &regular);
                }
                y -= ROW_HEIGHT;
            }
        }

        drop(canvas);
        doc.save_to_bytes().map_err(pdf_err)
    }
}

// A4 landscape.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 6.0;

/// Left edge in mm and the widest cell in characters, per column.
const PDF_COLUMNS: [(f32, usize); 6] = [
    (15.0, 24),
    (60.0, 32),
    (117.0, 18),
    (150.0, 22),
    (190.0, 36),
    (257.0, 16),
];

fn draw_header(canvas: &PdfLayerReference, font: &IndirectFontRef, y: f32) {
    for ((x, _), name) in PDF_COLUMNS.iter().zip(COLUMNS) {
        canvas.use_text(name, 10.0, Mm(*x), Mm(y), font);
    }
}

fn pdf_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(e.to_string())
}

fn clip(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut clipped: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(contacts: Vec<Contact>) -> ContactReport {
        let mut report = ContactReport::new("Acme", contacts);
        report.exported_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        report
    }

    fn contact(name: &str) -> Contact {
        Contact::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            "+46 70 123 45 67".to_string(),
            "consulting".to_string(),
            "Call me\nafter lunch".to_string(),
        )
    }

    #[test]
    fn title_stamp_and_filename_follow_export_time() {
        let report = report(vec![]);
        assert_eq!(report.title, "Acme - Contact Submissions");
        assert_eq!(report.exported_on(), "Exported on: 2024-03-09 14:05 UTC");
        assert_eq!(report.filename("pdf"), "contacts_20240309_140507.pdf");
    }

    #[test]
    fn clip_flattens_newlines_and_marks_truncation() {
        assert_eq!(clip("Call me\nlater", 40), "Call me later");
        assert_eq!(clip("abcdefghij", 6), "abc...");
        assert_eq!(clip("åäöåäö", 6), "åäöåäö");
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = report(vec![contact("Anna"), contact("Bo")]).to_xlsx().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn pdf_spans_pages_for_long_lists() {
        let contacts = (0..60).map(|i| contact(&format!("Lead{i}"))).collect();
        let bytes = report(contacts).to_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let empty = report(vec![]).to_pdf().unwrap();
        assert!(empty.starts_with(b"%PDF"));
        assert!(bytes.len() > empty.len());
    }
}
