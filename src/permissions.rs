// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Role and capability checks.
//!
//! Every role resolves to an [`Access`] value: the Technical Team is a
//! superuser and bypasses the flag set entirely, every other role is gated
//! flag by flag. Command handlers go through [`require`], never through
//! ad-hoc role comparisons.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::error::UdhError;
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Technical Team")]
    TechnicalTeam,
    Owner,
    Staff,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::TechnicalTeam => "Technical Team",
            Role::Owner => "Owner",
            Role::Staff => "Staff",
            Role::Worker => "Worker",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "technicalteam" | "tech" => Ok(Role::TechnicalTeam),
            "owner" => Ok(Role::Owner),
            "staff" => Ok(Role::Staff),
            "worker" => Ok(Role::Worker),
            _ => Err(anyhow!(
                "Invalid role '{}', expected Technical Team|Owner|Staff|Worker",
                s
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Add,
    Edit,
    Delete,
    Reports,
    Limits,
    Backup,
    Print,
    AddNew,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Add,
        Capability::Edit,
        Capability::Delete,
        Capability::Reports,
        Capability::Limits,
        Capability::Backup,
        Capability::Print,
        Capability::AddNew,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Add => "add",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
            Capability::Reports => "reports",
            Capability::Limits => "limits",
            Capability::Backup => "backup",
            Capability::Print => "print",
            Capability::AddNew => "addNew",
        }
    }
}

impl FromStr for Capability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("Unknown capability '{}'", s))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PermissionSet {
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
    pub reports: bool,
    pub limits: bool,
    pub backup: bool,
    pub print: bool,
    pub add_new: bool,
}

impl PermissionSet {
    pub fn get(&self, cap: Capability) -> bool {
        match cap {
            Capability::Add => self.add,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
            Capability::Reports => self.reports,
            Capability::Limits => self.limits,
            Capability::Backup => self.backup,
            Capability::Print => self.print,
            Capability::AddNew => self.add_new,
        }
    }

    pub fn set(&mut self, cap: Capability, value: bool) {
        let slot = match cap {
            Capability::Add => &mut self.add,
            Capability::Edit => &mut self.edit,
            Capability::Delete => &mut self.delete,
            Capability::Reports => &mut self.reports,
            Capability::Limits => &mut self.limits,
            Capability::Backup => &mut self.backup,
            Capability::Print => &mut self.print,
            Capability::AddNew => &mut self.add_new,
        };
        *slot = value;
    }

    pub fn from_caps(caps: &[Capability]) -> Self {
        let mut set = PermissionSet::default();
        for cap in caps {
            set.set(*cap, true);
        }
        set
    }

    /// Names of the flags that are switched on, in declaration order.
    pub fn granted(&self) -> Vec<&'static str> {
        Capability::ALL
            .iter()
            .filter(|c| self.get(**c))
            .map(|c| c.as_str())
            .collect()
    }
}

/// What a signed-in user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Superuser,
    Flagged(PermissionSet),
}

impl Access {
    pub fn for_user(user: &User) -> Self {
        match user.role {
            Role::TechnicalTeam => Access::Superuser,
            Role::Owner | Role::Staff | Role::Worker => Access::Flagged(user.permissions),
        }
    }

    pub fn allows(&self, cap: Capability) -> bool {
        match self {
            Access::Superuser => true,
            Access::Flagged(set) => set.get(cap),
        }
    }
}

pub fn can(user: Option<&User>, cap: Capability) -> bool {
    match user {
        None => false,
        Some(u) => Access::for_user(u).allows(cap),
    }
}

pub fn is_superuser(user: Option<&User>) -> bool {
    matches!(user.map(Access::for_user), Some(Access::Superuser))
}

pub fn require(user: Option<&User>, cap: Capability) -> Result<(), UdhError> {
    let Some(u) = user else {
        tracing::warn!(capability = %cap, "denied: nobody signed in");
        return Err(UdhError::NotSignedIn);
    };
    if Access::for_user(u).allows(cap) {
        Ok(())
    } else {
        tracing::warn!(user = %u.username, capability = %cap, "permission denied");
        Err(UdhError::PermissionDenied {
            user: u.username.clone(),
            capability: cap,
        })
    }
}

/// Read-only views only need somebody signed in.
pub fn require_signed_in(user: Option<&User>) -> Result<&User, UdhError> {
    user.ok_or_else(|| {
        tracing::warn!("denied: nobody signed in");
        UdhError::NotSignedIn
    })
}

/// Passes when any one of `caps` is granted. A denial names the first.
pub fn require_any(user: Option<&User>, caps: &[Capability]) -> Result<(), UdhError> {
    let u = require_signed_in(user)?;
    if caps.iter().any(|c| can(user, *c)) {
        return Ok(());
    }
    let capability = caps.first().copied().unwrap_or(Capability::AddNew);
    tracing::warn!(user = %u.username, capability = %capability, "permission denied");
    Err(UdhError::PermissionDenied {
        user: u.username.clone(),
        capability,
    })
}

pub fn require_superuser(user: Option<&User>) -> Result<(), UdhError> {
    let Some(u) = user else {
        return Err(UdhError::NotSignedIn);
    };
    if is_superuser(user) {
        Ok(())
    } else {
        tracing::warn!(user = %u.username, "restricted to the Technical Team");
        Err(UdhError::Restricted {
            user: u.username.clone(),
        })
    }
}
