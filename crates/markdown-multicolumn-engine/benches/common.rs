// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2

/// A document of `regions` legacy regions, each with `paragraphs` paragraphs
/// split by a column break halfway through.
#[allow(dead_code)]
pub fn generate_region_document(regions: usize, paragraphs: usize) -> String {
    let mut content = String::new();
    for region in 0..regions {
        content.push_str(&format!("Plain text before region {region}.\n\n"));
        content.push_str(&format!("--- start-multi-column: region-{region}\n\n"));
        for paragraph in 0..paragraphs {
            if paragraph == paragraphs / 2 {
                content.push_str("--- column-break ---\n\n");
            }
            content.push_str(&format!(
                "Paragraph {paragraph} of region {region} with enough words to wrap once.\n\n"
            ));
        }
        content.push_str("--- end-multi-column\n\n");
    }
    content
}

/// A single pandoc region nesting `divs` ordinary fenced divs.
#[allow(dead_code)]
pub fn generate_pandoc_document(divs: usize) -> String {
    let mut content = String::from("::: {.3-columns #bench}\n\n");
    for div in 0..divs {
        content.push_str(&format!("::: note\n\nNote {div}\n\n:::\n\n"));
    }
    content.push_str(":::\n");
    content
}
