//! Print the OpenAPI document as JSON.

use justiceconnect::doc::ApiDoc;
use utoipa::OpenApi;

fn main() {
    println!("{}", ApiDoc::openapi().to_json().unwrap());
}
