use trudy_core::{Agent, IdeaRoute, KnowledgeKind};

use crate::context::CampaignContext;

/// Prior outputs synthesis draws on. Missing ones are skipped.
#[derive(Debug, Default)]
pub struct SynthesisInputs<'a> {
    pub framing: Option<&'a str>,
    pub evaluation: Option<&'a str>,
    pub idea_routes: Option<&'a str>,
    pub judge: Option<&'a str>,
}

pub struct PhasePrompts;

impl PhasePrompts {
    /// System instruction for an agent.
    pub fn persona(agent: Agent) -> &'static str {
        match agent {
            Agent::Clara => {
                "You are Clara, strategy lead at a retail promotions agency. You write crisp, \
                 commercially grounded campaign thinking in markdown."
            }
            Agent::Bruce => {
                "You are Bruce, a blunt commercial realist. You judge whether a promotion will \
                 actually drive sales, and you say so plainly."
            }
            Agent::Iris => {
                "You are Iris, creative lead. You invent simple, ownable promotion ideas that a \
                 shopper understands in five seconds."
            }
            Agent::Strategist => {
                "You are a senior promotions strategist. You turn evaluation into a short list \
                 of concrete moves."
            }
            Agent::Judge => {
                "You are an impartial awards judge for retail promotions. You pick one winner \
                 and justify it briefly."
            }
            Agent::Researcher => {
                "You are a market researcher. You answer with short factual summaries and admit \
                 uncertainty instead of guessing."
            }
        }
    }

    pub fn framing(ctx: &CampaignContext) -> String {
        format!(
            r#"Frame the opportunity for this promotion before any ideas are developed.

{context}

## Required Output
Markdown with these headings:
1. The shopper moment
2. The commercial problem
3. What the promotion must do
4. Watch-outs

Keep it under 400 words."#,
            context = ctx.render_prompt_block()
        )
    }

    pub fn create(ctx: &CampaignContext) -> String {
        let missing = if ctx.classification.missing.is_empty() {
            "nothing".to_string()
        } else {
            ctx.classification.missing.join(", ")
        };

        format!(
            r#"Generate three to five distinct promotion routes for this brief.

{context}

The brief is missing: {missing}. Fill those gaps; keep anything the brief already fixes.

## Required Output
Reply with a JSON object only:
{{"summary": "one line", "routes": [{{"name": "", "hook": "", "mechanic": "", "prize": "", "rationale": ""}}]}}"#,
            context = ctx.render_prompt_block(),
            missing = missing
        )
    }

    pub fn evaluation(ctx: &CampaignContext, routes: &[IdeaRoute]) -> String {
        let subject = if routes.is_empty() {
            "Evaluate the promotion as briefed (hook, mechanic and prize above).".to_string()
        } else {
            let list: Vec<String> = routes.iter().map(Self::route_line).collect();
            format!("Evaluate these routes:\n{}", list.join("\n"))
        };

        format!(
            r#"{subject}

{context}

## Required Output
Reply with a JSON object only:
{{"summary": "markdown paragraph", "scores": [{{"criterion": "", "score": 0, "comment": ""}}], "overall": 0, "risks": [], "recommendations": []}}
Score each criterion from 0 to 10: simplicity, prize appeal, breadth, retail fit, brand fit."#,
            subject = subject,
            context = ctx.render_prompt_block()
        )
    }

    pub fn synthesis(ctx: &CampaignContext, inputs: &SynthesisInputs<'_>) -> String {
        let mut sections = Vec::new();
        let prior = [
            ("Framing", inputs.framing),
            ("Evaluation", inputs.evaluation),
            ("Idea routes", inputs.idea_routes),
            ("Judge verdict", inputs.judge),
        ];
        for (title, body) in prior {
            if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
                sections.push(format!("### {title}\n{body}"));
            }
        }
        let prior_work = if sections.is_empty() {
            "No earlier phase output exists; work from the brief alone.".to_string()
        } else {
            sections.join("\n\n")
        };

        format!(
            r#"Write the final campaign recommendation for the client.

{context}

## Earlier work
{prior_work}

## Required Output
Markdown: a one-line recommendation, then the hook, mechanic and prize, then
why it works, then next steps. Under 500 words."#,
            context = ctx.render_prompt_block(),
            prior_work = prior_work
        )
    }

    pub fn strategist(ctx: &CampaignContext, evaluation: Option<&str>) -> String {
        format!(
            r#"Turn the evaluation into strategy.

{context}

## Evaluation
{evaluation}

## Required Output
Reply with a JSON object only:
{{"summary": "", "recommendations": [], "risks": []}}"#,
            context = ctx.render_prompt_block(),
            evaluation = evaluation.unwrap_or("No evaluation has been run yet.")
        )
    }

    pub fn opinion(ctx: &CampaignContext, question: Option<&str>) -> String {
        let question = question
            .filter(|q| !q.trim().is_empty())
            .unwrap_or("What is your honest view of this promotion?");

        format!(
            r#"{question}

{context}

Answer in under 200 words of markdown."#,
            question = question,
            context = ctx.render_prompt_block()
        )
    }

    pub fn judge(ctx: &CampaignContext, routes: &[IdeaRoute], scores: &[(String, u32)]) -> String {
        let list: Vec<String> = routes
            .iter()
            .map(|route| {
                let heuristic = scores
                    .iter()
                    .find(|(name, _)| *name == route.name)
                    .map(|(_, total)| format!(" (heuristic {total}/100)"))
                    .unwrap_or_default();
                format!("{}{heuristic}", Self::route_line(route))
            })
            .collect();

        format!(
            r#"Pick the strongest route.

{context}

## Routes
{routes}

## Required Output
Reply with a JSON object only:
{{"winner": "route name", "verdict": "markdown justification", "ranking": ["best", "..."]}}"#,
            context = ctx.render_prompt_block(),
            routes = list.join("\n")
        )
    }

    pub fn knowledge(kind: KnowledgeKind, subject: &str, market: &str) -> String {
        let what = match kind {
            KnowledgeKind::Brand => "brand",
            KnowledgeKind::Prize => "prize",
        };
        format!(
            r#"Summarise what a promotions team should know about the {what} "{subject}" in market {market}.

Reply with a JSON object only:
{{"summary": "two or three sentences", "facts": ["short fact"]}}"#
        )
    }

    fn route_line(route: &IdeaRoute) -> String {
        format!(
            "- **{}**: {} / {} / {}",
            route.name,
            route.hook,
            route.mechanic,
            route.prize.as_deref().unwrap_or("prize tbc")
        )
    }
}
