use mongodb::{bson::Document, options::IndexOptions, IndexModel};

pub mod achievements;
pub mod game;

fn index(keys: Document, name: &str) -> IndexModel {
    let options = IndexOptions::builder().name(name.to_string()).build();

    IndexModel::builder().keys(keys).options(options).build()
}

fn unique_index(keys: Document, name: &str) -> IndexModel {
    let options = IndexOptions::builder()
        .name(name.to_string())
        .unique(true)
        .build();

    IndexModel::builder().keys(keys).options(options).build()
}

#[cfg(test)]
fn index_name(model: &IndexModel) -> Option<&str> {
    model.options.as_ref().and_then(|o| o.name.as_deref())
}
