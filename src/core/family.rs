//! Familien-Abfragen über die Blasen eines Containers.
//!
//! Eine Familie sind alle Blasen einer Ebene mit vergebener Reihenfolge,
//! aufsteigend sortiert. Die Reihenfolge muss nicht lückenlos sein.
//! Alle Abfragen sind lineare Scans ohne Cache; für Blasen ohne
//! Reihenfolge liefern sie nichts.

use super::bubble::Bubble;
use super::bubble_spec::{BubbleSpec, TailSpec, BUBBLE_VERSION};
use super::geometry::default_midpoint;
use glam::Vec2;

/// Familienmitglieder einer Ebene, aufsteigend nach Reihenfolge (stabil).
fn members_where<'a>(
    bubbles: &'a [Bubble],
    level: i32,
    mut keep: impl FnMut(&Bubble, u32) -> bool,
) -> Vec<&'a Bubble> {
    let mut members: Vec<&Bubble> = bubbles
        .iter()
        .filter(|b| b.level() == level)
        .filter(|b| b.spec().order.is_some_and(|order| keep(b, order.get())))
        .collect();
    members.sort_by_key(|b| b.spec().order_value());
    members
}

/// Alle Mitglieder der Familie auf `level`.
pub fn family_members(bubbles: &[Bubble], level: i32) -> Vec<&Bubble> {
    members_where(bubbles, level, |_, _| true)
}

/// Vorfahren (kleinere Reihenfolge), der früheste zuerst.
pub fn find_ancestors<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Vec<&'a Bubble> {
    let Some(own) = bubble.spec().order else {
        return Vec::new();
    };
    members_where(bubbles, bubble.level(), |_, order| order < own.get())
}

/// Direkter Elternteil (letzter Vorfahre).
pub fn find_parent<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Option<&'a Bubble> {
    find_ancestors(bubbles, bubble).pop()
}

/// Nächstes Mitglied mit größerer Reihenfolge.
pub fn find_child<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Option<&'a Bubble> {
    let own = bubble.spec().order?;
    members_where(bubbles, bubble.level(), |_, order| order > own.get())
        .into_iter()
        .next()
}

/// Alle anderen Mitglieder der Familie.
pub fn find_relatives<'a>(bubbles: &'a [Bubble], bubble: &Bubble) -> Vec<&'a Bubble> {
    if !bubble.spec().is_family_member() {
        return Vec::new();
    }
    let content = bubble.content();
    members_where(bubbles, bubble.level(), |other, _| other.content() != content)
}

/// Mitglied mit der größten Reihenfolge auf `level`.
pub fn last_in_family(bubbles: &[Bubble], level: i32) -> Option<&Bubble> {
    family_members(bubbles, level).pop()
}

/// Neue Spec für ein Kind, das an `last_order` angehängt wird.
///
/// Stil und Ebene kommen von der Familie; bisherige Eigenschaften des Kindes
/// werden verworfen. Der einzige Schwanz ist ein Verbindungsschwanz von
/// `root` (Kind) zu `tip` (letztes Mitglied).
pub fn child_spec(family_spec: &BubbleSpec, last_order: u32, root: Vec2, tip: Vec2) -> BubbleSpec {
    BubbleSpec {
        version: BUBBLE_VERSION.to_string(),
        style: family_spec.style.clone(),
        level: family_spec.level,
        order: None,
        tails: vec![TailSpec::new(tip, default_midpoint(root, tip), true)],
        background_colors: None,
    }
    .with_order(last_order.max(1) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bubble::ContentId;

    fn bubble(id: u64, level: i32, order: u32) -> Bubble {
        Bubble::new(
            ContentId::new(id),
            BubbleSpec::new("speech", level, vec![]).with_order(order),
            [1.0; 4],
        )
    }

    fn ids(bubbles: &[&Bubble]) -> Vec<u64> {
        bubbles.iter().map(|b| b.content().raw()).collect()
    }

    #[test]
    fn test_ancestors_and_child_with_gaps() {
        let bubbles = vec![bubble(3, 1, 3), bubble(1, 1, 1), bubble(4, 1, 4)];
        assert_eq!(ids(&find_ancestors(&bubbles, &bubbles[2])), vec![1, 3]);
        assert_eq!(find_child(&bubbles, &bubbles[1]).map(|b| b.content().raw()), Some(3));
        assert_eq!(find_parent(&bubbles, &bubbles[0]).map(|b| b.content().raw()), Some(1));
        assert!(find_parent(&bubbles, &bubbles[1]).is_none());
        assert!(find_child(&bubbles, &bubbles[2]).is_none());
    }

    #[test]
    fn test_other_levels_and_unordered_are_not_family() {
        let bubbles = vec![bubble(1, 1, 1), bubble(2, 2, 2), bubble(3, 1, 0), bubble(4, 1, 5)];
        assert_eq!(ids(&family_members(&bubbles, 1)), vec![1, 4]);
        assert_eq!(ids(&find_relatives(&bubbles, &bubbles[3])), vec![1]);
        assert!(find_ancestors(&bubbles, &bubbles[2]).is_empty());
        assert!(find_relatives(&bubbles, &bubbles[2]).is_empty());
        assert!(find_child(&bubbles, &bubbles[2]).is_none());
        assert_eq!(last_in_family(&bubbles, 1).map(|b| b.content().raw()), Some(4));
        assert!(last_in_family(&bubbles, 9).is_none());
    }

    #[test]
    fn test_relatives_exclude_only_self() {
        // gleiche Reihenfolge bei zwei Blasen: die andere bleibt Verwandte
        let bubbles = vec![bubble(1, 1, 2), bubble(2, 1, 2), bubble(3, 1, 1)];
        assert_eq!(ids(&find_relatives(&bubbles, &bubbles[0])), vec![3, 2]);
    }

    #[test]
    fn test_child_spec_discards_child_properties() {
        let family = BubbleSpec::new("shout", 3, vec![]).with_order(1);
        let root = Vec2::new(0.0, 0.0);
        let tip = Vec2::new(100.0, 0.0);
        let spec = child_spec(&family, 2, root, tip);
        assert_eq!(spec.style, "shout");
        assert_eq!(spec.level, 3);
        assert_eq!(spec.order_value(), 3);
        assert_eq!(spec.tails.len(), 1);
        assert!(spec.tails[0].joiner);
        assert_eq!(spec.tails[0].midpoint(), Vec2::new(50.0, 10.0));
        assert!(spec.background_colors.is_none());
    }
}
