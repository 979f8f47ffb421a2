use phieu_core::{ExtractedRecord, NormalizedRow, OrderNumbers, Scalar};

/// Flatten a batch of records, preserving record order and, within a
/// record, the original code order.
pub fn flatten_records(records: Vec<ExtractedRecord>) -> Vec<NormalizedRow> {
    records.iter().flat_map(flatten_record).collect()
}

/// Expand one record into `max(1, code count)` normalized rows.
///
/// Every output row is a fresh clone of the source record; the source is
/// never mutated.
pub fn flatten_record(record: &ExtractedRecord) -> Vec<NormalizedRow> {
    match &record.order_numbers {
        Some(OrderNumbers::Codes(codes)) if !codes.is_empty() => split_by_codes(record, codes),
        Some(order_numbers) => vec![base_row(record, order_numbers.collapsed())],
        None => vec![base_row(record, String::new())],
    }
}

/// One row per serial code. When the recorded quantity equals the number
/// of codes, each split line represents exactly one priced unit:
/// quantities collapse to 1 and the line total becomes the unit price.
/// On a mismatch the original quantity and price fields are duplicated
/// verbatim onto every split row; the discrepancy is left for manual
/// review. Known limitation: naive column sums over such rows inflate.
fn split_by_codes(record: &ExtractedRecord, codes: &[Scalar]) -> Vec<NormalizedRow> {
    let actual = record.quantity_actual.as_ref().and_then(Scalar::as_number);
    let doc = record.quantity_doc.as_ref().and_then(Scalar::as_number);
    let single = record.quantity.as_ref().and_then(Scalar::as_number);

    // The actually-issued quantity wins over the documented one; the
    // single-column schema only has `quantity`.
    let target_quantity = actual.or(doc).or(single);
    let is_count_match = target_quantity == Some(codes.len() as f64);

    codes
        .iter()
        .map(|code| {
            let mut row = base_row(record, code.to_string());
            if is_count_match {
                if actual.is_some() {
                    row.quantity_actual = Some(Scalar::Int(1));
                }
                if doc.is_some() {
                    row.quantity_doc = Some(Scalar::Int(1));
                }
                if single.is_some() {
                    row.quantity = Some(Scalar::Int(1));
                }
                if row.unitprice.as_ref().is_some_and(Scalar::is_truthy) {
                    row.totalprice = row.unitprice.clone();
                }
            }
            row
        })
        .collect()
}

fn base_row(record: &ExtractedRecord, order_numbers: String) -> NormalizedRow {
    NormalizedRow {
        doc_type: record.doc_type.clone(),
        date: record.date.clone(),
        id: record.id.clone(),
        name: record.name.clone(),
        description: record.description.clone(),
        code: record.code.clone(),
        unit: record.unit.clone(),
        quantity: record.quantity.clone(),
        quantity_doc: record.quantity_doc.clone(),
        quantity_actual: record.quantity_actual.clone(),
        unitprice: record.unitprice.clone(),
        totalprice: record.totalprice.clone(),
        order_numbers,
    }
}
