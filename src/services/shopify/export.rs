//! Catalog export engine: flattens vendor products (with optional size/color
//! variants and image lists) into the 47-column Shopify bulk-import CSV.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::entities::{product, user};
use crate::services::csv::{escape_field, join_row};

/// Fixed bulk-import header, in the exact order the importer expects.
pub const BULK_IMPORT_COLUMNS: [&str; 47] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Option3 Name",
    "Option3 Value",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Qty",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Image Src",
    "Image Position",
    "Image Alt Text",
    "Gift Card",
    "SEO Title",
    "SEO Description",
    "Google Shopping / Google Product Category",
    "Google Shopping / Gender",
    "Google Shopping / Age Group",
    "Google Shopping / MPN",
    "Google Shopping / AdWords Grouping",
    "Google Shopping / AdWords Labels",
    "Google Shopping / Condition",
    "Google Shopping / Custom Product",
    "Google Shopping / Custom Label 0",
    "Google Shopping / Custom Label 1",
    "Google Shopping / Custom Label 2",
    "Google Shopping / Custom Label 3",
    "Google Shopping / Custom Label 4",
    "Variant Image",
    "Variant Weight Unit",
    "Variant Tax Code",
    "Cost per item",
];

/// Maximum images carried per product.
const MAX_IMAGES: usize = 10;

const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/300x300";

/// One spreadsheet row. Every column is always emitted; blank columns stay
/// empty strings (continuation-row convention).
#[derive(Debug, Default, Clone)]
pub struct BulkImportRow {
    pub handle: String,
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: String,
    pub published: String,
    pub option1_name: String,
    pub option1_value: String,
    pub option2_name: String,
    pub option2_value: String,
    pub option3_name: String,
    pub option3_value: String,
    pub variant_sku: String,
    pub variant_grams: String,
    pub variant_inventory_tracker: String,
    pub variant_inventory_qty: String,
    pub variant_inventory_policy: String,
    pub variant_fulfillment_service: String,
    pub variant_price: String,
    pub variant_compare_at_price: String,
    pub variant_requires_shipping: String,
    pub variant_taxable: String,
    pub variant_barcode: String,
    pub image_src: String,
    pub image_position: String,
    pub image_alt_text: String,
    pub gift_card: String,
    pub seo_title: String,
    pub seo_description: String,
    pub google_product_category: String,
    pub google_gender: String,
    pub google_age_group: String,
    pub google_mpn: String,
    pub adwords_grouping: String,
    pub adwords_labels: String,
    pub google_condition: String,
    pub google_custom_product: String,
    pub custom_label_0: String,
    pub custom_label_1: String,
    pub custom_label_2: String,
    pub custom_label_3: String,
    pub custom_label_4: String,
    pub variant_image: String,
    pub variant_weight_unit: String,
    pub variant_tax_code: String,
    pub cost_per_item: String,
}

impl BulkImportRow {
    pub fn columns(&self) -> [&str; 47] {
        [
            &self.handle,
            &self.title,
            &self.body_html,
            &self.vendor,
            &self.product_type,
            &self.tags,
            &self.published,
            &self.option1_name,
            &self.option1_value,
            &self.option2_name,
            &self.option2_value,
            &self.option3_name,
            &self.option3_value,
            &self.variant_sku,
            &self.variant_grams,
            &self.variant_inventory_tracker,
            &self.variant_inventory_qty,
            &self.variant_inventory_policy,
            &self.variant_fulfillment_service,
            &self.variant_price,
            &self.variant_compare_at_price,
            &self.variant_requires_shipping,
            &self.variant_taxable,
            &self.variant_barcode,
            &self.image_src,
            &self.image_position,
            &self.image_alt_text,
            &self.gift_card,
            &self.seo_title,
            &self.seo_description,
            &self.google_product_category,
            &self.google_gender,
            &self.google_age_group,
            &self.google_mpn,
            &self.adwords_grouping,
            &self.adwords_labels,
            &self.google_condition,
            &self.google_custom_product,
            &self.custom_label_0,
            &self.custom_label_1,
            &self.custom_label_2,
            &self.custom_label_3,
            &self.custom_label_4,
            &self.variant_image,
            &self.variant_weight_unit,
            &self.variant_tax_code,
            &self.cost_per_item,
        ]
    }
}

/// Flattens products into bulk-import rows and serializes the spreadsheet.
#[derive(Debug, Clone)]
pub struct CatalogExporter {
    public_base_url: String,
}

impl CatalogExporter {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
        }
    }

    /// Serialize the whole export batch: one header line followed by the
    /// rows of every product. A malformed product degrades to a warning and
    /// never aborts the batch.
    pub fn export_csv(&self, items: &[(product::Model, user::Model)]) -> String {
        let rows = self.flatten_batch(items);

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(
            BULK_IMPORT_COLUMNS
                .iter()
                .map(|column| escape_field(column))
                .collect::<Vec<_>>()
                .join(","),
        );
        for row in &rows {
            lines.push(join_row(row.columns()));
        }

        let mut body = lines.join("\n");
        body.push('\n');
        body
    }

    /// Flatten every product of the batch into rows.
    pub fn flatten_batch(&self, items: &[(product::Model, user::Model)]) -> Vec<BulkImportRow> {
        let mut rows = Vec::new();
        // Image-less variant products carry full metadata only on the very
        // first such row of the whole batch; this mirrors the documented
        // exporter behavior.
        let mut batch_variant_meta_pending = true;

        for (product, vendor) in items {
            self.flatten_product(product, vendor, &mut batch_variant_meta_pending, &mut rows);
        }

        rows
    }

    fn flatten_product(
        &self,
        product: &product::Model,
        vendor: &user::Model,
        batch_variant_meta_pending: &mut bool,
        rows: &mut Vec<BulkImportRow>,
    ) {
        let handle = handle_or_fallback(&product.name, &product.id);
        let images = validate_images(&product.images, &self.public_base_url, product.id);
        let sizes = parse_string_list(product.sizes.as_deref(), "sizes", product.id);
        let colors = parse_string_list(product.colors.as_deref(), "colors", product.id);

        if sizes.is_empty() && colors.is_empty() {
            self.flatten_simple_product(product, vendor, &handle, &images, rows);
        } else {
            self.flatten_variant_product(
                product,
                vendor,
                &handle,
                &images,
                &sizes,
                &colors,
                batch_variant_meta_pending,
                rows,
            );
        }
    }

    /// A product without size/color axes: a single `Default Title` variant.
    fn flatten_simple_product(
        &self,
        product: &product::Model,
        vendor: &user::Model,
        handle: &str,
        images: &[String],
        rows: &mut Vec<BulkImportRow>,
    ) {
        if images.is_empty() {
            let mut row = BulkImportRow {
                handle: handle.to_string(),
                ..Default::default()
            };
            apply_product_meta(&mut row, product, vendor);
            apply_option_names(&mut row, false, false);
            row.option1_value = "Default Title".to_string();
            apply_variant_fields(
                &mut row,
                product.sku.clone().unwrap_or_default(),
                product.quantity,
                &product.price,
                product.delivery,
            );
            row.image_src = placeholder_image(&product.name);
            row.image_position = "1".to_string();
            rows.push(row);
            return;
        }

        for (index, image) in images.iter().enumerate() {
            let mut row = BulkImportRow {
                handle: handle.to_string(),
                image_src: image.clone(),
                image_position: (index + 1).to_string(),
                ..Default::default()
            };

            // Repeated product fields are redundant after the first line of
            // a product block.
            if index == 0 {
                apply_product_meta(&mut row, product, vendor);
                apply_option_names(&mut row, false, false);
                row.option1_value = "Default Title".to_string();
                apply_variant_fields(
                    &mut row,
                    product.sku.clone().unwrap_or_default(),
                    product.quantity,
                    &product.price,
                    product.delivery,
                );
            }

            rows.push(row);
        }
    }

    /// A product with one or both option axes: one variant per size x color
    /// combination, a singleton empty value standing in for an absent axis.
    #[allow(clippy::too_many_arguments)]
    fn flatten_variant_product(
        &self,
        product: &product::Model,
        vendor: &user::Model,
        handle: &str,
        images: &[String],
        sizes: &[String],
        colors: &[String],
        batch_variant_meta_pending: &mut bool,
        rows: &mut Vec<BulkImportRow>,
    ) {
        let size_axis: Vec<&str> = if sizes.is_empty() {
            vec![""]
        } else {
            sizes.iter().map(String::as_str).collect()
        };
        let color_axis: Vec<&str> = if colors.is_empty() {
            vec![""]
        } else {
            colors.iter().map(String::as_str).collect()
        };

        let combinations = size_axis.len() * color_axis.len();
        // Remainder units are dropped, not redistributed.
        let variant_quantity = product.quantity / combinations as i32;
        let id_prefix = product_id_prefix(&product.id);

        let mut variant_index = 0usize;
        for size in &size_axis {
            for color in &color_axis {
                let sku = format!("{}-{}", id_prefix, variant_index);
                let (option1_value, option2_value) = option_values(sizes, colors, size, color);

                if images.is_empty() {
                    let mut row = BulkImportRow {
                        handle: handle.to_string(),
                        ..Default::default()
                    };
                    if *batch_variant_meta_pending {
                        apply_product_meta(&mut row, product, vendor);
                        apply_option_names(&mut row, !sizes.is_empty(), !colors.is_empty());
                        *batch_variant_meta_pending = false;
                    }
                    row.option1_value = option1_value.clone();
                    row.option2_value = option2_value.clone();
                    apply_variant_fields(
                        &mut row,
                        sku.clone(),
                        variant_quantity,
                        &product.price,
                        product.delivery,
                    );
                    rows.push(row);
                } else {
                    for (image_index, image) in images.iter().enumerate() {
                        let mut row = BulkImportRow {
                            handle: handle.to_string(),
                            image_src: image.clone(),
                            image_position: (image_index + 1).to_string(),
                            ..Default::default()
                        };

                        if variant_index == 0 && image_index == 0 {
                            apply_product_meta(&mut row, product, vendor);
                            apply_option_names(&mut row, !sizes.is_empty(), !colors.is_empty());
                        }

                        if image_index == 0 {
                            row.option1_value = option1_value.clone();
                            row.option2_value = option2_value.clone();
                            apply_variant_fields(
                                &mut row,
                                sku.clone(),
                                variant_quantity,
                                &product.price,
                                product.delivery,
                            );
                        }

                        rows.push(row);
                    }
                }

                variant_index += 1;
            }
        }
    }
}

static NON_ALPHANUMERIC_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("[^a-z0-9]+").unwrap());

/// URL-safe slug: lowercase, every run of non-alphanumeric characters
/// collapsed to a single hyphen, no leading or trailing hyphens.
pub fn generate_handle(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_ALPHANUMERIC_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

fn handle_or_fallback(name: &str, id: &Uuid) -> String {
    let handle = generate_handle(name);
    if handle.is_empty() {
        id.to_string()
    } else {
        handle
    }
}

/// First 8 characters of the product id, the stable SKU prefix shared by all
/// of a product's variants.
fn product_id_prefix(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

/// Placeholder image carrying `text`, for listings without fetchable images.
pub fn placeholder_image(text: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
    format!("{}?text={}", PLACEHOLDER_BASE, encoded)
}

/// Validate a serialized image list. The importer requires fetchable URLs:
/// embedded data URIs and unresolvable references are replaced with
/// placeholders, root-relative paths are absolutized under the configured
/// public base URL. At most [`MAX_IMAGES`] entries survive, in input order.
pub fn validate_images(raw: &str, public_base_url: &str, product_id: Uuid) -> Vec<String> {
    let parsed: Vec<Value> = match serde_json::from_str(raw) {
        Ok(Value::Array(values)) => values,
        Ok(_) | Err(_) => {
            if !raw.trim().is_empty() && raw.trim() != "[]" {
                warn!(product_id = %product_id, "Unreadable image list; exporting without images");
            }
            return Vec::new();
        }
    };

    parsed
        .iter()
        .take(MAX_IMAGES)
        .map(|value| validate_image_value(value, public_base_url))
        .collect()
}

fn validate_image_value(value: &Value, public_base_url: &str) -> String {
    let Some(raw) = value.as_str() else {
        return placeholder_image("No Image");
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        placeholder_image("No Image")
    } else if trimmed.starts_with("data:") {
        // The importer needs fetchable URLs, not embedded binary.
        placeholder_image("Product Image")
    } else if trimmed.starts_with('/') {
        format!("{}{}", public_base_url.trim_end_matches('/'), trimmed)
    } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        placeholder_image("No Image")
    }
}

/// Parse a serialized option list; malformed data degrades to an empty list
/// with a warning and never fails the product.
pub fn parse_string_list(raw: Option<&str>, field: &str, product_id: Uuid) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(values) => values,
        Err(err) => {
            warn!(
                product_id = %product_id,
                field,
                error = %err,
                "Unreadable option list; treating as empty"
            );
            Vec::new()
        }
    }
}

/// Tag string for a product's vendor: the fixed marker, the vendor email,
/// and the first comma-delimited segment of the business address.
pub fn vendor_tags(vendor: &user::Model) -> String {
    let mut parts = vec!["vendor".to_string()];

    if !vendor.email.trim().is_empty() {
        parts.push(vendor.email.trim().to_string());
    }

    if let Some(address) = vendor.business_address.as_deref() {
        if let Some(segment) = address.split(',').next() {
            let segment = segment.trim();
            if !segment.is_empty() {
                parts.push(segment.to_string());
            }
        }
    }

    parts.join(", ")
}

fn apply_product_meta(row: &mut BulkImportRow, product: &product::Model, vendor: &user::Model) {
    row.title = product.name.clone();
    row.body_html = product.description.clone();
    row.vendor = vendor.display_label().to_string();
    row.product_type = product.category.clone();
    row.tags = vendor_tags(vendor);
    row.published = "TRUE".to_string();
    row.gift_card = "FALSE".to_string();
    row.seo_title = product.name.clone();
    row.seo_description = product.description.chars().take(320).collect();
    row.google_condition = "new".to_string();
    row.google_custom_product = "FALSE".to_string();
}

fn apply_option_names(row: &mut BulkImportRow, has_sizes: bool, has_colors: bool) {
    row.option1_name = if has_sizes {
        "Size".to_string()
    } else if has_colors {
        "Color".to_string()
    } else {
        "Title".to_string()
    };

    if has_sizes && has_colors {
        row.option2_name = "Color".to_string();
    }
}

fn option_values(
    sizes: &[String],
    colors: &[String],
    size: &str,
    color: &str,
) -> (String, String) {
    if !sizes.is_empty() && !colors.is_empty() {
        (size.to_string(), color.to_string())
    } else if !sizes.is_empty() {
        (size.to_string(), String::new())
    } else {
        (color.to_string(), String::new())
    }
}

fn apply_variant_fields(
    row: &mut BulkImportRow,
    sku: String,
    quantity: i32,
    price: &Decimal,
    delivery: bool,
) {
    row.variant_sku = sku;
    row.variant_grams = "0".to_string();
    row.variant_inventory_tracker = "shopify".to_string();
    row.variant_inventory_qty = quantity.to_string();
    row.variant_inventory_policy = "deny".to_string();
    row.variant_fulfillment_service = "manual".to_string();
    row.variant_price = format_price(price);
    row.variant_requires_shipping = if delivery { "TRUE" } else { "FALSE" }.to_string();
    row.variant_taxable = "TRUE".to_string();
}

/// Two-decimal price rendering.
pub fn format_price(value: &Decimal) -> String {
    let mut s = value.round_dp(2).to_string();
    if let Some(dot) = s.find('.') {
        let decimals = s.len() - dot - 1;
        if decimals == 0 {
            s.push_str("00");
        } else if decimals == 1 {
            s.push('0');
        }
    } else {
        s.push_str(".00");
    }
    s
}
