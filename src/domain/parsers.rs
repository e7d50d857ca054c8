use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::models::{Alliance, Division, Event, Match, Round, Team};
use crate::errors::with_parse_context;

/// Convert an untyped event payload into the typed model.
///
/// Expected shape: `{ id, sku, name, divisions: [{id, name}], matches: [...] }`.
pub fn parse_event(data: &Value) -> Result<Event> {
    let id = required_i64(data, "id").context("Failed to parse event")?;
    let matches = parse_matches(data.get("matches"))
        .with_context(|| format!("Failed to parse matches of event {}", id))?;

    Ok(Event {
        id,
        sku: optional_str(data, "sku"),
        name: optional_str(data, "name"),
        divisions: parse_divisions(data.get("divisions"))?,
        matches,
    })
}

fn parse_divisions(data: Option<&Value>) -> Result<Vec<Division>> {
    let Some(items) = data.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    items.iter().map(parse_division).collect()
}

fn parse_division(data: &Value) -> Result<Division> {
    Ok(Division {
        id: required_i64(data, "id").context("Failed to parse division")?,
        name: optional_str(data, "name"),
    })
}

fn parse_matches(data: Option<&Value>) -> Result<Vec<Match>> {
    let Some(items) = data.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    items.iter().map(parse_match).collect()
}

/// Convert a single untyped match payload into a [`Match`].
pub fn parse_match(data: &Value) -> Result<Match> {
    let id = required_i64(data, "id").context("Failed to parse match")?;
    let round_code = required_i64(data, "round").with_context(|| format!("match {}", id))?;
    let round = Round::from_code(round_code)
        .ok_or_else(|| anyhow!("Unknown round code {} in match {}", round_code, id))?;

    let (red, red_score) = parse_alliance(data, Alliance::Red)
        .with_context(|| format!("Failed to parse red alliance of match {}", id))?;
    let (blue, blue_score) = parse_alliance(data, Alliance::Blue)
        .with_context(|| format!("Failed to parse blue alliance of match {}", id))?;

    Ok(Match {
        id,
        event_id: nested_id(data, "event").unwrap_or(0),
        division_id: nested_id(data, "division").unwrap_or(0),
        round,
        instance: data.get("instance").and_then(Value::as_i64).unwrap_or(1),
        number: data.get("matchnum").and_then(Value::as_i64).unwrap_or(0),
        name: optional_str(data, "name"),
        red,
        blue,
        red_score,
        blue_score,
        scheduled: parse_timestamp(data.get("scheduled"))?,
        started: parse_timestamp(data.get("started"))?,
        predicted: false,
        predicted_red_score: 0,
        predicted_blue_score: 0,
    })
}

fn parse_alliance(data: &Value, alliance: Alliance) -> Result<([Team; 2], i64)> {
    let color = alliance_color(alliance);
    let Some(entry) = find_alliance(data, color) else {
        return Ok(([Team::NONE, Team::NONE], 0));
    };

    let score = entry.get("score").and_then(Value::as_i64).unwrap_or(0);
    let teams = parse_alliance_teams(entry)?;

    Ok((teams, score))
}

fn find_alliance<'a>(data: &'a Value, color: &str) -> Option<&'a Value> {
    data.get("alliances")?
        .as_array()?
        .iter()
        .find(|a| a.get("color").and_then(Value::as_str) == Some(color))
}

fn alliance_color(alliance: Alliance) -> &'static str {
    match alliance {
        Alliance::Red => "red",
        Alliance::Blue => "blue",
    }
}

fn parse_alliance_teams(entry: &Value) -> Result<[Team; 2]> {
    let mut slots = [Team::NONE, Team::NONE];
    let Some(items) = entry.get("teams").and_then(Value::as_array) else {
        return Ok(slots);
    };

    if items.len() > slots.len() {
        bail!("Alliance lists {} teams, at most 2 allowed", items.len());
    }

    for (slot, item) in slots.iter_mut().zip(items) {
        *slot = parse_team(item)?;
    }

    Ok(slots)
}

fn parse_team(item: &Value) -> Result<Team> {
    let team = item.get("team").unwrap_or(item);
    match team.get("id").and_then(Value::as_i64) {
        Some(id) => Ok(Team::new(id, optional_str(team, "name"))),
        None if team.is_null() => Ok(Team::NONE),
        None => bail!("Team entry has no id: {}", team),
    }
}

fn parse_timestamp(data: Option<&Value>) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = data.and_then(Value::as_str).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let parsed = with_parse_context(DateTime::parse_from_rfc3339(raw), "match timestamp")?;
    Ok(Some(parsed.with_timezone(&Utc)))
}

fn required_i64(data: &Value, field: &str) -> Result<i64> {
    data.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("Missing numeric field '{}'", field))
}

fn nested_id(data: &Value, field: &str) -> Option<i64> {
    data.get(field)?.get("id")?.as_i64()
}

fn optional_str(data: &Value, field: &str) -> String {
    data.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_match() -> Value {
        json!({
            "id": 101,
            "event": { "id": 7 },
            "division": { "id": 1, "name": "Science" },
            "round": 2,
            "instance": 1,
            "matchnum": 4,
            "name": "Qualifier #4",
            "scheduled": "2024-03-02T09:30:00-05:00",
            "started": null,
            "alliances": [
                { "color": "blue", "score": 21, "teams": [
                    { "team": { "id": 30, "name": "300C" } }
                ]},
                { "color": "red", "score": 48, "teams": [
                    { "team": { "id": 10, "name": "100A" } },
                    { "team": { "id": 20, "name": "200B" } }
                ]}
            ]
        })
    }

    #[test]
    fn test_parse_match() {
        let m = parse_match(&raw_match()).unwrap();

        assert_eq!(m.id, 101);
        assert_eq!(m.event_id, 7);
        assert_eq!(m.division_id, 1);
        assert_eq!(m.round, Round::Qualification);
        assert_eq!(m.red_score, 48);
        assert_eq!(m.blue_score, 21);
        assert_eq!(m.red[1].number, "200B");
        assert_eq!(m.blue[0].id, 30);
        assert!(m.blue[1].is_none());
        assert!(m.scheduled.is_some());
        assert!(m.started.is_none());
    }

    #[test]
    fn test_rejects_oversized_alliance() {
        let mut data = raw_match();
        data["alliances"][0]["teams"] = json!([
            { "team": { "id": 1 } }, { "team": { "id": 2 } }, { "team": { "id": 3 } }
        ]);

        assert!(parse_match(&data).is_err());
    }

    #[test]
    fn test_rejects_unknown_round() {
        let mut data = raw_match();
        data["round"] = json!(42);

        assert!(parse_match(&data).is_err());
    }

    #[test]
    fn test_parse_event() {
        let data = json!({
            "id": 7,
            "sku": "RE-VRC-23-1234",
            "name": "State Championship",
            "divisions": [{ "id": 1, "name": "Science" }],
            "matches": [raw_match()]
        });

        let event = parse_event(&data).unwrap();
        assert_eq!(event.sku, "RE-VRC-23-1234");
        assert_eq!(event.divisions.len(), 1);
        assert_eq!(event.matches_for(1).len(), 1);
    }
}
