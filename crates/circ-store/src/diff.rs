//! Snapshot comparison.
//!
//! Lists the numeric fields that changed between two snapshots of the same
//! project. Entities are matched by key (name, or stock key), not by arena
//! position, so any two snapshots can be compared. An entity present on only
//! one side is reported as a change of its `exists` field (0 or 1).

use std::collections::BTreeMap;

use circ_model::numeric::approx_eq;
use circ_model::{EntityKind, World};

#[derive(Clone, Debug, PartialEq)]
pub struct FieldChange {
    pub kind: EntityKind,
    pub entity: String,
    pub field: &'static str,
    pub before: f64,
    pub after: f64,
}

type Fields = Vec<(&'static str, f64)>;

/// Every field that differs by more than the shared tolerance, in
/// `(kind, entity, field)` order.
pub fn diff_snapshots(before: &World, after: &World) -> Vec<FieldChange> {
    let a = flatten(before);
    let b = flatten(after);
    let mut out = Vec::new();

    for (key, fields_a) in &a {
        let (kind, entity) = key;
        match b.get(key) {
            Some(fields_b) => {
                for ((field, x), (_, y)) in fields_a.iter().zip(fields_b.iter()) {
                    if !same(*x, *y) {
                        out.push(FieldChange {
                            kind: *kind,
                            entity: entity.clone(),
                            field: *field,
                            before: *x,
                            after: *y,
                        });
                    }
                }
            }
            None => out.push(existence(*kind, entity, 1.0, 0.0)),
        }
    }
    for (kind, entity) in b.keys().filter(|k| !a.contains_key(*k)) {
        out.push(existence(*kind, entity, 0.0, 1.0));
    }
    out.sort_by(|x, y| {
        (x.kind, &x.entity, x.field).cmp(&(y.kind, &y.entity, y.field))
    });
    out
}

fn same(x: f64, y: f64) -> bool {
    (x.is_nan() && y.is_nan()) || approx_eq(x, y)
}

fn existence(kind: EntityKind, entity: &str, before: f64, after: f64) -> FieldChange {
    FieldChange {
        kind,
        entity: entity.to_string(),
        field: "exists",
        before,
        after,
    }
}

fn flatten(w: &World) -> BTreeMap<(EntityKind, String), Fields> {
    let mut m = BTreeMap::new();

    let g = &w.global;
    m.insert(
        (EntityKind::Global, "global".to_string()),
        vec![
            ("melt", g.melt),
            ("rate_of_exploitation", g.rate_of_exploitation),
            ("population_growth_rate", g.population_growth_rate),
            ("investment_ratio", g.investment_ratio),
        ],
    );

    for (id, c) in w.commodities() {
        m.insert(
            (EntityKind::Commodity, c.name.clone()),
            vec![
                ("unit_value", c.unit_value),
                ("unit_price", c.unit_price),
                ("total_supply", c.total_supply),
                ("total_demand", c.total_demand),
                ("total_quantity", w.total_quantity(id)),
                ("total_value", w.total_value(id)),
                ("total_price", w.total_price(id)),
                ("surplus_product", c.surplus_product),
                ("allocation_share", c.allocation_share),
                ("stock_used_up", c.stock_used_up),
                ("stock_produced", c.stock_produced),
            ],
        );
    }

    for (id, i) in w.industries() {
        m.insert(
            (EntityKind::Industry, i.name.clone()),
            vec![
                ("output", i.output),
                ("proposed_output", i.proposed_output),
                ("constrained_output", i.constrained_output),
                ("initial_capital", i.initial_capital),
                ("current_capital", w.current_capital(id)),
                ("growth_rate", i.growth_rate),
                ("profit_earned", i.profit_earned),
            ],
        );
    }

    for (_, c) in w.classes() {
        m.insert(
            (EntityKind::SocialClass, c.name.clone()),
            vec![
                ("size", c.size),
                ("participation_ratio", c.participation_ratio),
                ("revenue", c.revenue),
            ],
        );
    }

    for (id, s) in w.stocks() {
        m.insert(
            (EntityKind::Stock, w.stock_key(id)),
            vec![
                ("quantity", s.quantity),
                ("value", s.value),
                ("price", s.price),
                ("replenishment_demand", s.replenishment_demand),
                ("expansion_demand", s.expansion_demand),
                ("stock_used_up", s.stock_used_up),
            ],
        );
    }

    m
}
