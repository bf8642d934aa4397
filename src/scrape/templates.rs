//! Placeholder component bodies used when a page yields no usable code.

/// Template for `name`, or the generic default. `{Component}` is replaced by
/// a PascalCase identifier derived from `name`.
pub fn fallback_code(name: &str) -> String {
    let template = match name {
        "marquee" => MARQUEE,
        "magic-card" | "card" => CARD,
        "3d-card-effect" | "3d-card" => CARD_3D,
        "shimmer-button" | "button" => SHIMMER_BUTTON,
        "animated-beam" | "border-beam" | "background-beams" => BEAM,
        "number-ticker" => NUMBER_TICKER,
        "sparkles" | "particles" | "meteors" => PARTICLES,
        "text-generate-effect" | "typewriter-effect" => TEXT_REVEAL,
        _ => GENERIC,
    };
    template.replace("{Component}", &component_ident(name))
}

/// `3d-card-effect` -> `Ui3dCardEffect`, `marquee` -> `Marquee`.
pub fn component_ident(name: &str) -> String {
    let ident: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    match ident.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => ident,
        Some(_) => format!("Ui{}", ident),
        None => "Component".to_string(),
    }
}

const GENERIC: &str = r##""use client";

import React from "react";
import { cn } from "@/lib/utils";

export interface {Component}Props extends React.HTMLAttributes<HTMLDivElement> {}

export function {Component}({ className, children, ...props }: {Component}Props) {
  return (
    <div
      className={cn("relative rounded-lg border bg-background p-4 shadow-sm", className)}
      {...props}
    >
      {children}
    </div>
  );
}
"##;

const MARQUEE: &str = r##"import { cn } from "@/lib/utils";

interface {Component}Props {
  className?: string;
  reverse?: boolean;
  pauseOnHover?: boolean;
  vertical?: boolean;
  repeat?: number;
  children?: React.ReactNode;
}

export function {Component}({
  className,
  reverse = false,
  pauseOnHover = false,
  vertical = false,
  repeat = 4,
  children,
}: {Component}Props) {
  return (
    <div
      className={cn(
        "group flex overflow-hidden p-2 [--duration:40s] [--gap:1rem] [gap:var(--gap)]",
        vertical ? "flex-col" : "flex-row",
        className,
      )}
    >
      {Array.from({ length: repeat }).map((_, i) => (
        <div
          key={i}
          className={cn(
            "flex shrink-0 justify-around [gap:var(--gap)]",
            vertical ? "animate-marquee-vertical flex-col" : "animate-marquee flex-row",
            pauseOnHover && "group-hover:[animation-play-state:paused]",
            reverse && "[animation-direction:reverse]",
          )}
        >
          {children}
        </div>
      ))}
    </div>
  );
}
"##;

const CARD: &str = r##""use client";

import React, { useCallback, useRef } from "react";
import { cn } from "@/lib/utils";

interface {Component}Props extends React.HTMLAttributes<HTMLDivElement> {
  gradientSize?: number;
  gradientColor?: string;
}

export function {Component}({
  className,
  children,
  gradientSize = 200,
  gradientColor = "#262626",
}: {Component}Props) {
  const ref = useRef<HTMLDivElement>(null);

  const onMouseMove = useCallback((e: React.MouseEvent<HTMLDivElement>) => {
    const rect = ref.current?.getBoundingClientRect();
    if (!rect) return;
    ref.current?.style.setProperty("--x", `${e.clientX - rect.left}px`);
    ref.current?.style.setProperty("--y", `${e.clientY - rect.top}px`);
  }, []);

  return (
    <div
      ref={ref}
      onMouseMove={onMouseMove}
      className={cn("group relative overflow-hidden rounded-xl border bg-neutral-100 dark:bg-neutral-900", className)}
      style={{
        background: `radial-gradient(${gradientSize}px circle at var(--x) var(--y), ${gradientColor}, transparent 100%)`,
      }}
    >
      <div className="relative z-10">{children}</div>
    </div>
  );
}
"##;

const CARD_3D: &str = r##""use client";

import React, { useRef, useState } from "react";
import { cn } from "@/lib/utils";

export function {Component}({
  children,
  className,
}: {
  children?: React.ReactNode;
  className?: string;
}) {
  const ref = useRef<HTMLDivElement>(null);
  const [transform, setTransform] = useState("rotateY(0deg) rotateX(0deg)");

  const handleMouseMove = (e: React.MouseEvent<HTMLDivElement>) => {
    if (!ref.current) return;
    const { left, top, width, height } = ref.current.getBoundingClientRect();
    const x = (e.clientX - left - width / 2) / 25;
    const y = (e.clientY - top - height / 2) / 25;
    setTransform(`rotateY(${x}deg) rotateX(${-y}deg)`);
  };

  return (
    <div className="flex items-center justify-center py-20" style={{ perspective: "1000px" }}>
      <div
        ref={ref}
        onMouseMove={handleMouseMove}
        onMouseLeave={() => setTransform("rotateY(0deg) rotateX(0deg)")}
        className={cn("relative transition-all duration-200 ease-linear [transform-style:preserve-3d]", className)}
        style={{ transform }}
      >
        {children}
      </div>
    </div>
  );
}
"##;

const SHIMMER_BUTTON: &str = r##"import React from "react";
import { cn } from "@/lib/utils";

export interface {Component}Props extends React.ButtonHTMLAttributes<HTMLButtonElement> {
  shimmerColor?: string;
  background?: string;
}

export const {Component} = React.forwardRef<HTMLButtonElement, {Component}Props>(
  ({ shimmerColor = "#ffffff", background = "rgba(0, 0, 0, 1)", className, children, ...props }, ref) => (
    <button
      ref={ref}
      style={{ "--shimmer-color": shimmerColor, "--bg": background } as React.CSSProperties}
      className={cn(
        "group relative flex cursor-pointer items-center justify-center overflow-hidden whitespace-nowrap rounded-full px-6 py-3 text-white [background:var(--bg)]",
        "transform-gpu transition-transform duration-300 ease-in-out active:translate-y-px",
        className,
      )}
      {...props}
    >
      {children}
    </button>
  ),
);

{Component}.displayName = "{Component}";
"##;

const BEAM: &str = r##""use client";

import { motion } from "motion/react";
import { cn } from "@/lib/utils";

export function {Component}({ className, duration = 6 }: { className?: string; duration?: number }) {
  return (
    <div className={cn("pointer-events-none absolute inset-0 overflow-hidden rounded-[inherit]", className)}>
      <motion.div
        className="absolute h-px w-1/2 bg-gradient-to-r from-transparent via-sky-500 to-transparent"
        initial={{ x: "-100%" }}
        animate={{ x: "200%" }}
        transition={{ duration, repeat: Infinity, ease: "linear" }}
      />
    </div>
  );
}
"##;

const NUMBER_TICKER: &str = r##""use client";

import { useEffect, useRef } from "react";
import { useInView, useMotionValue, useSpring } from "motion/react";
import { cn } from "@/lib/utils";

export function {Component}({ value, className }: { value: number; className?: string }) {
  const ref = useRef<HTMLSpanElement>(null);
  const motionValue = useMotionValue(0);
  const spring = useSpring(motionValue, { damping: 60, stiffness: 100 });
  const inView = useInView(ref, { once: true });

  useEffect(() => {
    if (inView) motionValue.set(value);
  }, [inView, motionValue, value]);

  useEffect(
    () =>
      spring.on("change", (latest) => {
        if (ref.current) ref.current.textContent = Intl.NumberFormat("en-US").format(Math.round(latest));
      }),
    [spring],
  );

  return <span ref={ref} className={cn("inline-block tabular-nums tracking-wider", className)} />;
}
"##;

const PARTICLES: &str = r##""use client";

import React, { useMemo } from "react";
import { cn } from "@/lib/utils";

export function {Component}({ quantity = 40, className }: { quantity?: number; className?: string }) {
  const dots = useMemo(
    () =>
      Array.from({ length: quantity }, () => ({
        top: `${Math.random() * 100}%`,
        left: `${Math.random() * 100}%`,
        delay: `${Math.random() * 2}s`,
      })),
    [quantity],
  );

  return (
    <div className={cn("pointer-events-none absolute inset-0 overflow-hidden", className)}>
      {dots.map((d, i) => (
        <span
          key={i}
          className="absolute h-1 w-1 animate-pulse rounded-full bg-white"
          style={{ top: d.top, left: d.left, animationDelay: d.delay }}
        />
      ))}
    </div>
  );
}
"##;

const TEXT_REVEAL: &str = r##""use client";

import { motion } from "motion/react";
import { cn } from "@/lib/utils";

export function {Component}({ words, className }: { words: string; className?: string }) {
  return (
    <div className={cn("font-bold", className)}>
      {words.split(" ").map((word, i) => (
        <motion.span
          key={word + i}
          initial={{ opacity: 0, filter: "blur(10px)" }}
          animate={{ opacity: 1, filter: "blur(0px)" }}
          transition={{ duration: 0.5, delay: i * 0.2 }}
          className="mr-1 inline-block dark:text-white"
        >
          {word}
        </motion.span>
      ))}
    </div>
  );
}
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_get_their_template() {
        let code = fallback_code("marquee");
        assert!(code.contains("export function Marquee("));
        assert!(code.contains("pauseOnHover"));
        assert!(!code.contains("{Component}"));
    }

    #[test]
    fn unknown_names_get_generic_default() {
        let code = fallback_code("orbiting-circles");
        assert!(code.contains("export function OrbitingCircles("));
        assert!(code.contains("OrbitingCirclesProps"));
    }

    #[test]
    fn identifiers_never_start_with_a_digit() {
        assert_eq!(component_ident("3d-card-effect"), "Ui3dCardEffect");
        assert_eq!(component_ident("shimmer-button"), "ShimmerButton");
        assert_eq!(component_ident("--"), "Component");
        assert!(fallback_code("3d-card-effect").contains("export function Ui3dCardEffect("));
    }
}
