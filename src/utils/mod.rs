pub mod archive_lookup;
pub mod document_download;
pub mod pdf;
pub mod publication_locator;
pub mod scrape_proxy;

#[cfg(test)]
pub mod test_support;
