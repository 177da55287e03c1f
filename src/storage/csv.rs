use crate::core::ProductRecord;
use crate::ScraperResult;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const HEADER: [&str; 3] = ["product-image", "product-name", "product-price"];

/// Writes product listings as a BOM-prefixed UTF-8 CSV file.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    path: PathBuf,
}

impl CsvStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> ScraperResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file with a header row followed by one row per record.
    pub fn write_products(&self, records: &[ProductRecord]) -> ScraperResult<usize> {
        let mut file = File::create(&self.path)?;
        file.write_all(UTF8_BOM)?;
        write_rows(file, records)?;

        debug!("Wrote {} products to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    pub fn read_products(&self) -> ScraperResult<Vec<ProductRecord>> {
        read_products(&self.path)
    }

    /// Number of records already in the file; `None` when there is no file
    /// or it cannot be read as a products CSV.
    pub fn existing_count(&self) -> Option<usize> {
        if !self.path.exists() {
            return None;
        }
        match self.read_products() {
            Ok(records) => Some(records.len()),
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

pub fn write_rows<W: Write>(writer: W, records: &[ProductRecord]) -> ScraperResult<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for record in records {
        wtr.write_record(record.as_row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a products CSV back; a leading BOM is optional.
pub fn read_products<P: AsRef<Path>>(path: P) -> ScraperResult<Vec<ProductRecord>> {
    let raw = fs::read(path)?;
    let body = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw[..]);

    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(body);
    let mut records = Vec::new();
    for row in rdr.deserialize::<ProductRecord>() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_csv() -> PathBuf {
        std::env::temp_dir()
            .join("catalog_scraper_tests")
            .join(format!("{}.csv", Uuid::now_v7()))
    }

    #[test]
    fn test_exact_bytes() {
        let storage = CsvStorage::new(temp_csv()).unwrap();
        let records = vec![
            ProductRecord::new("https://cdn.test/a.jpg", "Kind of Blue", "450,000₫"),
            ProductRecord::new("", "Say \"Hi\"", ""),
        ];
        storage.write_products(&records).unwrap();

        let bytes = fs::read(storage.path()).unwrap();
        let expected = "\u{FEFF}product-image,product-name,product-price\n\
                        https://cdn.test/a.jpg,Kind of Blue,\"450,000₫\"\n\
                        ,\"Say \"\"Hi\"\"\",\n";
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_header_written_without_records() {
        let storage = CsvStorage::new(temp_csv()).unwrap();
        assert_eq!(storage.write_products(&[]).unwrap(), 0);

        let bytes = fs::read(storage.path()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(
            &bytes[UTF8_BOM.len()..],
            b"product-image,product-name,product-price\n"
        );
        assert!(storage.read_products().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order_and_escaping() {
        let storage = CsvStorage::new(temp_csv()).unwrap();
        let records = vec![
            ProductRecord::new("/1.jpg", "Abbey Road, Remastered", "1.200.000₫"),
            ProductRecord::new("", "The \"White\" Album", "990,000"),
            ProductRecord::new("/3.jpg", "Line\nBreak", ""),
            ProductRecord::new("/4.jpg", "  spaced  ", " 10 "),
        ];
        storage.write_products(&records).unwrap();

        assert_eq!(storage.read_products().unwrap(), records);
    }

    #[test]
    fn test_read_without_bom() {
        let path = temp_csv();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "product-image,product-name,product-price\n/x.png,X,1\n").unwrap();

        let records = read_products(&path).unwrap();
        assert_eq!(records, vec![ProductRecord::new("/x.png", "X", "1")]);
    }

    #[test]
    fn test_existing_count() {
        let storage = CsvStorage::new(temp_csv()).unwrap();
        assert_eq!(storage.existing_count(), None);

        storage
            .write_products(&[ProductRecord::default(), ProductRecord::default()])
            .unwrap();
        assert_eq!(storage.existing_count(), Some(2));

        fs::write(storage.path(), "sku,qty
A1,3
").unwrap();
        assert_eq!(storage.existing_count(), None);
    }

    #[test]
    fn test_creates_parent_directories() {
        let path = std::env::temp_dir()
            .join("catalog_scraper_tests")
            .join(Uuid::now_v7().to_string())
            .join("nested")
            .join("products.csv");
        let storage = CsvStorage::new(&path).unwrap();
        storage.write_products(&[ProductRecord::default()]).unwrap();
        assert!(path.exists());
    }
}
