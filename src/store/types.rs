/// Related table pulled into each row through a foreign key
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    /// Key the related row appears under
    pub alias: String,
    pub table: String,
    /// Column on the parent row referencing the related row's `id`
    pub foreign_key: String,
    pub columns: Vec<String>,
}

/// Column list for a read, with optional embedded relations
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Empty means every column
    pub columns: Vec<String>,
    pub embeds: Vec<Embed>,
}

impl Select {
    /// Every column, no relations
    pub fn all() -> Self {
        Self {
            columns: Vec::new(),
            embeds: Vec::new(),
        }
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Render as a PostgREST `select` parameter, e.g. `*,agent:agents(id,name)`
    pub fn to_query(&self) -> String {
        let mut parts = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };

        for embed in &self.embeds {
            let columns = if embed.columns.is_empty() {
                "*".to_string()
            } else {
                embed.columns.join(",")
            };
            parts.push(format!("{}:{}({})", embed.alias, embed.table, columns));
        }

        parts.join(",")
    }
}

impl Default for Select {
    fn default() -> Self {
        Self::all()
    }
}
