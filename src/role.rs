#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Role {
    pub fn group_code(self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defender => "DEF",
            Role::Midfielder => "MID",
            Role::Forward => "FWD",
        }
    }

    /// Classifies the provider's free-form position strings. The rows
    /// are ordered; earlier patterns win ("GK" must beat the generic
    /// "BACK" fallback, "DM" is a midfielder despite the D). Unknown
    /// strings are None, never an error.
    pub fn from_position(position: &str) -> Option<Role> {
        let p = position.trim().to_uppercase();
        if p.is_empty() {
            return None;
        }
        if p == "G" || p == "GK" || p.contains("GOALKEEPER") {
            return Some(Role::Goalkeeper);
        }
        if p == "D"
            || p == "DF"
            || p.starts_with("DC")
            || p.starts_with("DR")
            || p.starts_with("DL")
            || p.contains("DEF")
        {
            return Some(Role::Defender);
        }
        if p == "M" || p == "MF" || p == "AM" || p == "DM" || p.contains("MID") || p.starts_with("MC")
        {
            return Some(Role::Midfielder);
        }
        if p == "F"
            || p == "FW"
            || p == "ST"
            || p == "LW"
            || p == "RW"
            || p.contains("FORWARD")
            || p.contains("ATTACK")
        {
            return Some(Role::Forward);
        }
        if p.contains("WING") || p.contains("STRIK") {
            return Some(Role::Forward);
        }
        if p.contains("CENTER BACK") || p.contains("CENTRE BACK") {
            return Some(Role::Defender);
        }
        if p.contains("FULL BACK") || p.contains("BACK") {
            return Some(Role::Defender);
        }
        if p.contains("MIDF") {
            return Some(Role::Midfielder);
        }
        None
    }

    /// Group codes as they appear in results and CLI arguments.
    pub fn from_group_code(code: &str) -> Option<Role> {
        match code.trim().to_uppercase().as_str() {
            "GK" => Some(Role::Goalkeeper),
            "DEF" => Some(Role::Defender),
            "MID" => Some(Role::Midfielder),
            "FWD" => Some(Role::Forward),
            _ => None,
        }
    }
}
