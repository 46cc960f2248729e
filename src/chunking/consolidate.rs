//! Chunk metadata from the metadata of its elements.

use crate::elements::{Element, ElementMetadata};

/// Metadata of a chunk built from `elements`.
///
/// Document-level scalars come from the first element that has them. List
/// fields are concatenated, languages kept once each in order of appearance.
/// Element-specific fields (coordinates, detection data, hierarchy, table
/// HTML, continuation flag) are left empty.
pub(crate) fn consolidate_metadata(elements: &[Element], include_orig_elements: bool) -> ElementMetadata {
    let mut metadata = ElementMetadata::default();

    for element in elements {
        let m = &element.metadata;
        first_wins(&mut metadata.filename, &m.filename);
        first_wins(&mut metadata.file_directory, &m.file_directory);
        first_wins(&mut metadata.last_modified, &m.last_modified);
        first_wins(&mut metadata.filetype, &m.filetype);
        first_wins(&mut metadata.page_number, &m.page_number);
        first_wins(&mut metadata.page_name, &m.page_name);
        first_wins(&mut metadata.data_source, &m.data_source);

        extend(&mut metadata.emphasized_text_contents, &m.emphasized_text_contents);
        extend(&mut metadata.emphasized_text_tags, &m.emphasized_text_tags);
        extend(&mut metadata.link_urls, &m.link_urls);
        extend(&mut metadata.link_texts, &m.link_texts);

        if let Some(languages) = &m.languages {
            let merged = metadata.languages.get_or_insert_with(Vec::new);
            for language in languages {
                if !merged.contains(language) {
                    merged.push(language.clone());
                }
            }
        }
    }

    if include_orig_elements {
        metadata.orig_elements = Some(elements.to_vec());
    }
    metadata
}

fn first_wins<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if target.is_none() {
        target.clone_from(value);
    }
}

fn extend(target: &mut Option<Vec<String>>, values: &Option<Vec<String>>) {
    if let Some(values) = values {
        target.get_or_insert_with(Vec::new).extend(values.iter().cloned());
    }
}
